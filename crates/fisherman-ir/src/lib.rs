//! fisherman Circuit Intermediate Representation
//!
//! This crate provides the circuit data structures used to describe quantum
//! state preparations in fisherman. A state is identified with the circuit
//! that prepares it from `|0…0⟩`; overlap estimation composes, inverts and
//! binds these circuits, it never mutates them.
//!
//! # Core Components
//!
//! - **Qubits and Classical Bits**: [`QubitId`], [`ClbitId`]
//! - **Gates**: [`StandardGate`] with adjoint rules ([`StandardGate::inverse`])
//! - **Parameters**: [`ParameterExpression`] for symbolic angles
//! - **Instructions**: [`Instruction`] combining gates with their operands
//! - **Circuit**: [`Circuit`] builder with `inverse`, `compose`,
//!   `bind_parameters` and `measure_all`
//!
//! # Example: Compute-Uncompute Circuit
//!
//! ```rust
//! use fisherman_ir::{Circuit, QubitId};
//!
//! let mut psi = Circuit::new("psi", 2);
//! psi.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
//!
//! let mut cu = psi.clone();
//! cu.barrier_all().unwrap();
//! cu.compose(&psi.inverse().unwrap()).unwrap();
//! cu.measure_all().unwrap();
//!
//! assert_eq!(cu.num_qubits(), 2);
//! assert_eq!(cu.num_clbits(), 2);
//! ```
//!
//! # Example: Parameterized Preparation
//!
//! ```rust
//! use fisherman_ir::{Circuit, QubitId, ParameterExpression};
//! use std::collections::HashMap;
//!
//! let mut ansatz = Circuit::new("ansatz", 1);
//! ansatz.ry(ParameterExpression::symbol("theta"), QubitId(0)).unwrap();
//! assert!(ansatz.is_parameterized());
//!
//! let bound = ansatz.bind_parameters(&HashMap::from([("theta".to_string(), 0.25)]));
//! assert!(!bound.is_parameterized());
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod parameter;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use parameter::ParameterExpression;
pub use qubit::{ClbitId, QubitId};
