//! Inner-product expressions for exact evaluation.
//!
//! An [`Observable`] names the inner products to compute without computing
//! them. It can be rewritten by a [`ValueTransform`] or by a
//! [`CircuitSampler`] before [`Observable::evaluate`] reduces it to complex
//! numbers.

use std::fmt;

use fisherman_adapter_sim::Statevector;
use fisherman_hal::{Backend, HalError};
use fisherman_ir::{Circuit, InstructionKind};
use ndarray::Array2;
use num_complex::Complex64;
use tracing::{debug, instrument};

use crate::error::{OverlapError, OverlapResult};
use crate::result::{Overlap, upper_triangle};
use crate::state::QuantumState;

/// ⟨bra|ket⟩ in one of three shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Observable {
    /// A single inner product.
    Single {
        /// Left state.
        bra: QuantumState,
        /// Right state.
        ket: QuantumState,
    },
    /// One bra against each ket.
    Row {
        /// Left state.
        bra: QuantumState,
        /// Right states, in order.
        kets: Vec<QuantumState>,
    },
    /// Every pair of a sequence, ⟨states|states⟩.
    Gram {
        /// The sequence.
        states: Vec<QuantumState>,
    },
}

impl Observable {
    /// Rebuild the expression with every state passed through `f`.
    pub fn try_map_states(
        self,
        mut f: impl FnMut(QuantumState) -> OverlapResult<QuantumState>,
    ) -> OverlapResult<Self> {
        Ok(match self {
            Observable::Single { bra, ket } => Observable::Single {
                bra: f(bra)?,
                ket: f(ket)?,
            },
            Observable::Row { bra, kets } => Observable::Row {
                bra: f(bra)?,
                kets: kets.into_iter().map(&mut f).collect::<OverlapResult<_>>()?,
            },
            Observable::Gram { states } => Observable::Gram {
                states: states.into_iter().map(f).collect::<OverlapResult<_>>()?,
            },
        })
    }

    /// All states of the expression, bra first.
    pub fn states(&self) -> Vec<&QuantumState> {
        match self {
            Observable::Single { bra, ket } => vec![bra, ket],
            Observable::Row { bra, kets } => std::iter::once(bra).chain(kets).collect(),
            Observable::Gram { states } => states.iter().collect(),
        }
    }

    /// Compute the inner products.
    pub fn evaluate(&self) -> OverlapResult<InnerProducts> {
        match self {
            Observable::Single { bra, ket } => {
                let bra = bra.statevector()?;
                Ok(InnerProducts::Scalar(bra.inner_product(&*ket.statevector()?)))
            }
            Observable::Row { bra, kets } => {
                let bra = bra.statevector()?;
                let row = kets
                    .iter()
                    .map(|ket| Ok(bra.inner_product(&*ket.statevector()?)))
                    .collect::<OverlapResult<_>>()?;
                Ok(InnerProducts::Vector(row))
            }
            Observable::Gram { states } => {
                let svs = states
                    .iter()
                    .map(QuantumState::statevector)
                    .collect::<OverlapResult<Vec<_>>>()?;
                let n = svs.len();
                let mut gram = Array2::zeros((n, n));
                for (i, j) in upper_triangle(n) {
                    let v = svs[i].inner_product(&svs[j]);
                    gram[[i, j]] = v;
                    gram[[j, i]] = v.conj();
                }
                Ok(InnerProducts::Matrix(gram))
            }
        }
    }
}

/// Evaluated inner products, same shape as the observable.
#[derive(Debug, Clone, PartialEq)]
pub enum InnerProducts {
    /// One value.
    Scalar(Complex64),
    /// One value per ket.
    Vector(Vec<Complex64>),
    /// Gram matrix, Hermitian.
    Matrix(Array2<Complex64>),
}

impl InnerProducts {
    /// Elementwise |z|², clamped into [0, 1].
    pub fn squared_magnitude(&self) -> Overlap {
        let sq = |z: &Complex64| z.norm_sqr().clamp(0.0, 1.0);
        match self {
            InnerProducts::Scalar(z) => Overlap::Scalar(sq(z)),
            InnerProducts::Vector(v) => Overlap::Vector(v.iter().map(sq).collect()),
            InnerProducts::Matrix(m) => Overlap::Matrix(m.map(sq)),
        }
    }
}

/// Rewrites an observable before evaluation.
pub trait ValueTransform: Send + Sync {
    /// Name for logs.
    fn name(&self) -> &str;

    /// Produce the observable to evaluate instead of `observable`.
    fn convert(&self, observable: Observable) -> OverlapResult<Observable>;
}

impl fmt::Debug for dyn ValueTransform + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValueTransform").field(&self.name()).finish()
    }
}

/// Applies the same unitary to every state of an observable.
///
/// ⟨Ua|Ub⟩ = ⟨a|b⟩, so overlaps are unchanged.
#[derive(Debug, Clone)]
pub struct BasisChange {
    unitary: Circuit,
}

impl BasisChange {
    /// Wrap a unitary circuit.
    ///
    /// The circuit must be fully bound and contain only gates and barriers.
    pub fn new(unitary: Circuit) -> OverlapResult<Self> {
        if let Some(inst) = unitary
            .instructions()
            .iter()
            .find(|inst| matches!(inst.kind, InstructionKind::Measure | InstructionKind::Reset))
        {
            return Err(OverlapError::Transform(format!(
                "basis change '{}' contains non-unitary '{}'",
                unitary.name(),
                inst.name()
            )));
        }
        if unitary.is_parameterized() {
            return Err(OverlapError::Transform(format!(
                "basis change '{}' has unbound parameters",
                unitary.name()
            )));
        }
        Ok(Self { unitary })
    }

    fn apply(&self, state: QuantumState) -> OverlapResult<QuantumState> {
        state.ensure_width(self.unitary.num_qubits())?;
        Ok(match state {
            QuantumState::Prepared(mut circuit) => {
                circuit.compose(&self.unitary)?;
                QuantumState::Prepared(circuit)
            }
            QuantumState::Amplitudes(mut sv) => {
                for inst in self.unitary.instructions() {
                    sv.apply(inst)?;
                }
                QuantumState::Amplitudes(sv)
            }
        })
    }
}

impl ValueTransform for BasisChange {
    fn name(&self) -> &str {
        self.unitary.name()
    }

    fn convert(&self, observable: Observable) -> OverlapResult<Observable> {
        observable.try_map_states(|s| self.apply(s))
    }
}

/// Replaces prepared states with the amplitudes an exact backend reports.
pub struct CircuitSampler<'a> {
    backend: &'a dyn Backend,
}

impl<'a> CircuitSampler<'a> {
    /// Use `backend` for amplitude evaluation.
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// Convert every prepared state of `observable`.
    ///
    /// Amplitude states pass through unchanged.
    #[instrument(skip_all, fields(backend = self.backend.name()))]
    pub async fn convert(&self, observable: Observable) -> OverlapResult<Observable> {
        let mut fetched = Vec::new();
        for state in observable.states() {
            fetched.push(match state.circuit() {
                Some(circuit) => Some(self.fetch(circuit).await?),
                None => None,
            });
        }
        debug!(states = fetched.len(), "fetched statevectors");

        let mut fetched = fetched.into_iter();
        observable.try_map_states(|state| {
            Ok(match fetched.next().flatten() {
                Some(sv) => QuantumState::Amplitudes(sv),
                None => state,
            })
        })
    }

    async fn fetch(&self, circuit: &Circuit) -> OverlapResult<Statevector> {
        let amplitudes = self.backend.statevector(circuit).await?;
        let len = amplitudes.len();
        Statevector::from_amplitudes(amplitudes)
            .filter(|sv| sv.num_qubits() == circuit.num_qubits())
            .ok_or_else(|| {
                HalError::Backend(format!(
                    "statevector of length {len} for a {}-qubit circuit",
                    circuit.num_qubits()
                ))
                .into()
            })
    }
}
