//! fisherman Overlap Estimation
//!
//! This crate estimates the squared overlap |⟨ψ|φ⟩|² between quantum states
//! with the compute-uncompute method: prepare ψ, undo the preparation of φ,
//! and read off the probability of the all-zero outcome.
//!
//! # Strategies
//!
//! The backend decides how overlaps are obtained:
//!
//! - **Exact**: no backend, or one whose [`Capabilities`](fisherman_hal::Capabilities)
//!   report an ideal statevector simulator. Overlaps are inner products of
//!   amplitude vectors.
//! - **Sampling**: any other backend. One compute-uncompute circuit per state
//!   pair is submitted in a single batch and the all-zero frequency is the
//!   estimate.
//!
//! # Calling Shapes
//!
//! - No comparison state: self-overlap, a scalar close to 1.
//! - One comparison state: a scalar.
//! - A list of comparison states: a vector.
//! - A [`ParameterBinding`]: the symmetric n×n matrix of overlaps between
//!   every pair of sweep points.
//!
//! # Example
//!
//! ```ignore
//! use fisherman_adapter_sim::SimulatorBackend;
//! use fisherman_ir::{Circuit, ParameterExpression, QubitId};
//! use fisherman_overlap::{OverlapEstimator, ParameterBinding, QuantumState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut ansatz = Circuit::new("ansatz", 2);
//!     ansatz
//!         .ry(ParameterExpression::symbol("theta"), QubitId(0))?
//!         .cx(QubitId(0), QubitId(1))?;
//!     let state = QuantumState::from(ansatz);
//!
//!     let backend = SimulatorBackend::noisy(0.01, 0.02);
//!     let kernel = OverlapEstimator::new(&state)
//!         .sweep(ParameterBinding::new().with("theta", [0.0, 0.5, 1.0]))
//!         .with_backend(&backend)
//!         .run()
//!         .await?;
//!
//!     println!("{:?}", kernel.as_matrix());
//!     Ok(())
//! }
//! ```

pub mod binding;
pub mod config;
pub mod error;
pub mod estimator;
pub mod exact;
pub mod expression;
pub mod mode;
pub mod result;
pub mod sampling;
pub mod state;

pub use binding::ParameterBinding;
pub use config::OverlapConfig;
pub use error::{OverlapError, OverlapResult};
pub use estimator::{OverlapEstimator, compute_uncompute_overlap};
pub use expression::{BasisChange, CircuitSampler, InnerProducts, Observable, ValueTransform};
pub use mode::{Candidates, ExecutionMode, OutputShape, OverlapRequest};
pub use result::{Overlap, sym_from_triu, triangular_len, triu_index, upper_triangle};
pub use sampling::cu_circuit;
pub use state::QuantumState;
