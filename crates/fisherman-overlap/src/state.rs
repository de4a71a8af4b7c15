//! Quantum states as seen by overlap estimation.

use std::borrow::Cow;

use fisherman_adapter_sim::Statevector;
use fisherman_ir::Circuit;

use crate::error::{OverlapError, OverlapResult};

/// A state on a fixed number of qubits.
///
/// Either the circuit that prepares it from `|0…0⟩`, possibly with unbound
/// symbolic angles, or an explicit amplitude vector. Only prepared states
/// can be sampled on a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantumState {
    /// State-preparation circuit.
    Prepared(Circuit),
    /// Ready-to-evaluate amplitudes.
    Amplitudes(Statevector),
}

impl QuantumState {
    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        match self {
            QuantumState::Prepared(c) => c.num_qubits(),
            QuantumState::Amplitudes(sv) => sv.num_qubits(),
        }
    }

    /// Human-readable label used in errors and logs.
    pub fn label(&self) -> &str {
        match self {
            QuantumState::Prepared(c) => c.name(),
            QuantumState::Amplitudes(_) => "amplitudes",
        }
    }

    /// The preparation circuit, if this state has one.
    pub fn circuit(&self) -> Option<&Circuit> {
        match self {
            QuantumState::Prepared(c) => Some(c),
            QuantumState::Amplitudes(_) => None,
        }
    }

    /// The preparation circuit, or [`OverlapError::NotPreparable`].
    pub fn preparation(&self) -> OverlapResult<&Circuit> {
        self.circuit()
            .ok_or_else(|| OverlapError::NotPreparable(self.label().to_string()))
    }

    /// Check whether the preparation still has unbound parameters.
    pub fn is_parameterized(&self) -> bool {
        self.circuit().is_some_and(Circuit::is_parameterized)
    }

    /// Amplitudes of this state, simulating the preparation locally if needed.
    pub fn statevector(&self) -> OverlapResult<Cow<'_, Statevector>> {
        match self {
            QuantumState::Prepared(c) => Ok(Cow::Owned(Statevector::from_circuit(c)?)),
            QuantumState::Amplitudes(sv) => Ok(Cow::Borrowed(sv)),
        }
    }

    pub(crate) fn ensure_width(&self, expected: usize) -> OverlapResult<()> {
        match self.num_qubits() {
            got if got == expected => Ok(()),
            got => Err(OverlapError::QubitCountMismatch { expected, got }),
        }
    }
}

impl From<Circuit> for QuantumState {
    fn from(circuit: Circuit) -> Self {
        QuantumState::Prepared(circuit)
    }
}

impl From<Statevector> for QuantumState {
    fn from(sv: Statevector) -> Self {
        QuantumState::Amplitudes(sv)
    }
}
