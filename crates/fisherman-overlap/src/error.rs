//! Error types for overlap estimation.

use fisherman_hal::HalError;
use fisherman_ir::IrError;
use thiserror::Error;

/// Errors that can occur while estimating overlaps.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OverlapError {
    /// Both a comparison state and a parameter sweep were supplied.
    #[error("state1 and param_dict are mutually exclusive; supply at most one")]
    InvalidArgumentCombination,

    /// The execution backend failed.
    #[error("Backend error: {0}")]
    Backend(#[from] HalError),

    /// A circuit could not be built, bound or simulated.
    #[error("Circuit error: {0}")]
    Circuit(#[from] IrError),

    /// An amplitude-only state was used where a preparation circuit is needed.
    #[error("State '{0}' has no preparation circuit and cannot be sampled")]
    NotPreparable(String),

    /// Two states act on different numbers of qubits.
    #[error("Qubit count mismatch: expected {expected}, got {got}")]
    QubitCountMismatch {
        /// Width of `state0`.
        expected: usize,
        /// Width of the other state.
        got: usize,
    },

    /// The backend returned a different number of count tables than circuits.
    #[error("Backend returned {got} count tables for {expected} circuits")]
    CountsMismatch {
        /// Number of submitted circuits.
        expected: usize,
        /// Number of returned tables.
        got: usize,
    },

    /// A packed upper triangle has the wrong length.
    #[error("Upper triangle of a {n}x{n} matrix needs {expected} values, got {got}")]
    TriangularLength {
        /// Matrix dimension.
        n: usize,
        /// n(n+1)/2.
        expected: usize,
        /// Supplied length.
        got: usize,
    },

    /// A value transform rejected the observable.
    #[error("Value transform failed: {0}")]
    Transform(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for overlap operations.
pub type OverlapResult<T> = Result<T, OverlapError>;
