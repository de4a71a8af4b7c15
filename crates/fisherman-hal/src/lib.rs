//! fisherman Hardware Abstraction Layer
//!
//! This crate provides the interface overlap estimation uses to run
//! circuits: a common [`Backend`] trait for batch submission, the
//! [`Capabilities`] descriptor used to tell exact backends from sampling
//! ones, and result types ([`ExecutionResult`], [`Counts`]).
//!
//! # Example: Running a Batch
//!
//! ```ignore
//! use std::time::Duration;
//! use fisherman_hal::Backend;
//! use fisherman_adapter_sim::SimulatorBackend;
//! use fisherman_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut bell = Circuit::bell()?;
//!     bell.measure_all()?;
//!
//!     let backend = SimulatorBackend::new();
//!     let job_id = backend.submit(&[bell], 1000).await?;
//!     let result = backend.wait(&job_id, Duration::from_millis(10)).await?;
//!
//!     if let Some((bitstring, count)) = result.counts[0].most_frequent() {
//!         println!("Most frequent: {bitstring} ({count} times)");
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, ValidationResult,
};
pub use capability::{Capabilities, FEATURE_SHOTS, FEATURE_STATEVECTOR, NoiseProfile};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use result::{Counts, ExecutionResult};
