//! Request classification and mode selection.
//!
//! Both decisions are made once, up front: the optional inputs collapse into
//! an [`OverlapRequest`] whose variant fixes the [`OutputShape`], and the
//! backend collapses into an [`ExecutionMode`].

use std::fmt;

use fisherman_hal::Backend;
use fisherman_ir::Circuit;

use crate::binding::ParameterBinding;
use crate::error::{OverlapError, OverlapResult};
use crate::state::QuantumState;

/// The state(s) `state0` is compared against.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidates {
    /// A single state; yields a scalar.
    One(QuantumState),
    /// A list of states; yields a vector, even of length one.
    Many(Vec<QuantumState>),
}

impl Candidates {
    /// Number of candidate states.
    pub fn len(&self) -> usize {
        match self {
            Candidates::One(_) => 1,
            Candidates::Many(states) => states.len(),
        }
    }

    /// Check whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The candidates as a sequence.
    pub fn into_vec(self) -> Vec<QuantumState> {
        match self {
            Candidates::One(state) => vec![state],
            Candidates::Many(states) => states,
        }
    }
}

impl From<QuantumState> for Candidates {
    fn from(state: QuantumState) -> Self {
        Candidates::One(state)
    }
}

impl From<Circuit> for Candidates {
    fn from(circuit: Circuit) -> Self {
        Candidates::One(circuit.into())
    }
}

impl From<Vec<QuantumState>> for Candidates {
    fn from(states: Vec<QuantumState>) -> Self {
        Candidates::Many(states)
    }
}

/// What to compute.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlapRequest {
    /// ⟨state0|state0⟩.
    SelfOverlap,
    /// `state0` against the candidates.
    Against(Candidates),
    /// All pairs of `state0` bound at every sweep point.
    Sweep(ParameterBinding),
}

impl OverlapRequest {
    /// Collapse the optional inputs into a request.
    ///
    /// Supplying both is [`OverlapError::InvalidArgumentCombination`].
    pub fn resolve(
        state1: Option<Candidates>,
        param_dict: Option<ParameterBinding>,
    ) -> OverlapResult<Self> {
        match (state1, param_dict) {
            (Some(_), Some(_)) => Err(OverlapError::InvalidArgumentCombination),
            (Some(candidates), None) => Ok(OverlapRequest::Against(candidates)),
            (None, Some(binding)) => Ok(OverlapRequest::Sweep(binding)),
            (None, None) => Ok(OverlapRequest::SelfOverlap),
        }
    }

    /// Shape of the result.
    ///
    /// A sweep whose value lists differ in length has no shape.
    pub fn output_shape(&self) -> OverlapResult<OutputShape> {
        Ok(match self {
            OverlapRequest::SelfOverlap | OverlapRequest::Against(Candidates::One(_)) => {
                OutputShape::Scalar
            }
            OverlapRequest::Against(Candidates::Many(states)) => OutputShape::Vector(states.len()),
            OverlapRequest::Sweep(binding) => OutputShape::Matrix(binding.len()?),
        })
    }
}

impl fmt::Display for OverlapRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapRequest::SelfOverlap => write!(f, "self"),
            OverlapRequest::Against(Candidates::One(_)) => write!(f, "pair"),
            OverlapRequest::Against(Candidates::Many(s)) => write!(f, "list[{}]", s.len()),
            OverlapRequest::Sweep(_) => write!(f, "sweep"),
        }
    }
}

/// Shape of an [`Overlap`](crate::Overlap), fixed before computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    /// One value.
    Scalar,
    /// `n` values.
    Vector(usize),
    /// `n`×`n` symmetric matrix.
    Matrix(usize),
}

/// How overlaps will be computed.
#[derive(Clone, Copy)]
pub enum ExecutionMode<'a> {
    /// Linear algebra on amplitudes, taken from the backend when present.
    Exact {
        /// Exact backend, if any.
        backend: Option<&'a dyn Backend>,
    },
    /// Compute-uncompute circuits run on the backend.
    Sampling {
        /// Sampling or noisy backend.
        backend: &'a dyn Backend,
    },
}

impl<'a> ExecutionMode<'a> {
    /// Classify `backend` from its capabilities.
    ///
    /// No backend and exact backends both select [`ExecutionMode::Exact`].
    pub fn classify(backend: Option<&'a dyn Backend>) -> Self {
        match backend {
            None => ExecutionMode::Exact { backend: None },
            Some(b) if b.capabilities().is_exact() => ExecutionMode::Exact { backend: Some(b) },
            Some(b) => ExecutionMode::Sampling { backend: b },
        }
    }

    /// Check whether this is exact evaluation.
    pub fn is_exact(&self) -> bool {
        matches!(self, ExecutionMode::Exact { .. })
    }

    /// The backend, if any.
    pub fn backend(&self) -> Option<&'a dyn Backend> {
        match *self {
            ExecutionMode::Exact { backend } => backend,
            ExecutionMode::Sampling { backend } => Some(backend),
        }
    }
}

impl fmt::Display for ExecutionMode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Exact { .. } => write!(f, "exact")?,
            ExecutionMode::Sampling { .. } => write!(f, "sampling")?,
        }
        if let Some(backend) = self.backend() {
            write!(f, " ({})", backend.name())?;
        }
        Ok(())
    }
}

impl fmt::Debug for ExecutionMode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionMode")
            .field("exact", &self.is_exact())
            .field("backend", &self.backend().map(|b| b.name()))
            .finish()
    }
}
