//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not found in circuit.
    #[error("Qubit {qubit} not found in circuit{}", format_gate_context(.gate_name))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Classical bit not found in circuit.
    #[error("Classical bit {clbit} not found in circuit")]
    ClbitNotFound {
        /// The classical bit that was not found.
        clbit: ClbitId,
    },

    /// Gate requires different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Two circuits cannot be combined because their widths differ.
    #[error("Circuit width mismatch: expected {expected} qubits, got {got}")]
    WidthMismatch {
        /// Width of the receiving circuit.
        expected: usize,
        /// Width of the other circuit.
        got: usize,
    },

    /// Parameter is unbound.
    #[error("Parameter '{0}' is unbound")]
    UnboundParameter(String),

    /// Parameter expression cannot be evaluated (e.g. division by zero).
    #[error("Invalid parameter expression: {0}")]
    InvalidParameter(String),

    /// Parameter sweep with value lists of different lengths.
    #[error("Parameter '{parameter}' has {got} values, expected {expected}")]
    BindingLengthMismatch {
        /// The offending parameter.
        parameter: String,
        /// Length shared by the other parameters.
        expected: usize,
        /// Length of this parameter's value list.
        got: usize,
    },

    /// Circuit is too wide to hold as a dense statevector.
    #[error("Circuit has {num_qubits} qubits; statevector simulation supports at most {max}")]
    TooManyQubits {
        /// Width of the circuit.
        num_qubits: usize,
        /// Largest supported width.
        max: usize,
    },

    /// Cannot invert a non-unitary operation.
    #[error("Cannot invert non-unitary operation: {0}")]
    NonUnitaryOperation(String),
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
