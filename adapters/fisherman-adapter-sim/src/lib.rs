//! fisherman Local Statevector Simulator
//!
//! This crate provides a local simulator backend for overlap estimation and
//! the statevector engine the exact evaluation path runs on.
//!
//! # Modes
//!
//! | Mode | Amplitudes | Counts | Classified as |
//! |------|------------|--------|---------------|
//! | `statevector` | yes | ideal | exact |
//! | `shots` | no | ideal | sampling |
//! | `noisy` | no | depolarizing + readout error | sampling |
//!
//! Memory grows as 2^n complex numbers; the default limit is 20 qubits.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use fisherman_adapter_sim::SimulatorBackend;
//! use fisherman_hal::Backend;
//! use fisherman_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = SimulatorBackend::noisy(0.01, 0.02).with_seed(7);
//!
//!     let mut circuit = Circuit::ghz(3)?;
//!     circuit.measure_all()?;
//!     let job_id = backend.submit(&[circuit], 1000).await?;
//!     let result = backend.wait(&job_id, Duration::from_millis(10)).await?;
//!
//!     // Mostly 000 and 111, with a little leakage
//!     println!("Results: {:?}", result.counts[0]);
//!     Ok(())
//! }
//! ```

mod simulator;
mod statevector;

pub use simulator::{SimulationMode, SimulatorBackend};
pub use statevector::{MAX_STATEVECTOR_QUBITS, Statevector};
