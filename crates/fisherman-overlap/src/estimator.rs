//! Overlap estimation entry points.

use std::fmt;

use fisherman_hal::Backend;
use tracing::{debug, instrument};

use crate::binding::ParameterBinding;
use crate::config::OverlapConfig;
use crate::error::OverlapResult;
use crate::exact::evaluate_exact;
use crate::expression::ValueTransform;
use crate::mode::{Candidates, ExecutionMode, OverlapRequest};
use crate::result::Overlap;
use crate::sampling::evaluate_sampling;
use crate::state::QuantumState;

/// Estimate |⟨state0|state1⟩|² with the default [`OverlapConfig`].
///
/// The result shape follows the optional inputs:
///
/// | `state1` | `param_dict` | result |
/// |----------|--------------|--------|
/// | `None` | `None` | scalar, ⟨state0\|state0⟩ |
/// | `One` | `None` | scalar |
/// | `Many` | `None` | vector, one entry per candidate |
/// | `None` | `Some` | n×n matrix over the sweep |
///
/// Supplying both `state1` and `param_dict` fails before the backend is
/// touched. Without a backend, or with an exact one, overlaps are computed
/// from amplitudes; otherwise they are sampled with compute-uncompute
/// circuits.
pub async fn compute_uncompute_overlap(
    state0: &QuantumState,
    state1: Option<Candidates>,
    param_dict: Option<ParameterBinding>,
    expectation: Option<&dyn ValueTransform>,
    backend: Option<&dyn Backend>,
) -> OverlapResult<Overlap> {
    let request = OverlapRequest::resolve(state1, param_dict)?;
    estimate(state0, &request, expectation, backend, &OverlapConfig::default()).await
}

#[instrument(skip_all, fields(state = state0.label()))]
async fn estimate(
    state0: &QuantumState,
    request: &OverlapRequest,
    expectation: Option<&dyn ValueTransform>,
    backend: Option<&dyn Backend>,
    config: &OverlapConfig,
) -> OverlapResult<Overlap> {
    let shape = request.output_shape()?;
    let mode = ExecutionMode::classify(backend);
    debug!(%request, ?shape, %mode, "estimating overlap");

    match mode {
        ExecutionMode::Exact { backend } => {
            evaluate_exact(state0, request, expectation, backend).await
        }
        ExecutionMode::Sampling { backend } => {
            if let Some(transform) = expectation {
                debug!(
                    transform = transform.name(),
                    "value transform ignored when sampling"
                );
            }
            evaluate_sampling(state0, request, backend, config).await
        }
    }
}

/// Builder over [`compute_uncompute_overlap`] with an explicit configuration.
///
/// ```
/// use fisherman_ir::Circuit;
/// use fisherman_overlap::{OverlapEstimator, QuantumState};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bell = QuantumState::from(Circuit::bell()?);
/// let overlap = OverlapEstimator::new(&bell).run().await?;
/// assert!((overlap.as_scalar().unwrap() - 1.0).abs() < 1e-10);
/// # Ok(())
/// # }
/// ```
pub struct OverlapEstimator<'a> {
    state0: &'a QuantumState,
    state1: Option<Candidates>,
    param_dict: Option<ParameterBinding>,
    expectation: Option<&'a dyn ValueTransform>,
    backend: Option<&'a dyn Backend>,
    config: OverlapConfig,
}

impl fmt::Debug for OverlapEstimator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlapEstimator")
            .field("state0", &self.state0.label())
            .field("state1", &self.state1)
            .field("param_dict", &self.param_dict)
            .field("expectation", &self.expectation)
            .field("backend", &self.backend.map(|b| b.name()))
            .field("config", &self.config)
            .finish()
    }
}

impl<'a> OverlapEstimator<'a> {
    /// Start from the reference state.
    pub fn new(state0: &'a QuantumState) -> Self {
        Self {
            state0,
            state1: None,
            param_dict: None,
            expectation: None,
            backend: None,
            config: OverlapConfig::default(),
        }
    }

    /// Compare against a single state.
    #[must_use]
    pub fn against(mut self, state: impl Into<QuantumState>) -> Self {
        self.state1 = Some(Candidates::One(state.into()));
        self
    }

    /// Compare against each of `states`.
    #[must_use]
    pub fn against_all(mut self, states: impl IntoIterator<Item = QuantumState>) -> Self {
        self.state1 = Some(Candidates::Many(states.into_iter().collect()));
        self
    }

    /// Sweep `state0` over `binding`.
    #[must_use]
    pub fn sweep(mut self, binding: ParameterBinding) -> Self {
        self.param_dict = Some(binding);
        self
    }

    /// Rewrite the observable before exact evaluation.
    #[must_use]
    pub fn with_expectation(mut self, transform: &'a dyn ValueTransform) -> Self {
        self.expectation = Some(transform);
        self
    }

    /// Run on `backend`.
    #[must_use]
    pub fn with_backend(mut self, backend: &'a dyn Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use `config` instead of the defaults.
    #[must_use]
    pub fn with_config(mut self, config: OverlapConfig) -> Self {
        self.config = config;
        self
    }

    /// Compute the overlap.
    ///
    /// Fails with [`OverlapError::Config`](crate::OverlapError::Config) if
    /// the configuration does not validate.
    pub async fn run(self) -> OverlapResult<Overlap> {
        let request = OverlapRequest::resolve(self.state1, self.param_dict)?;
        self.config.validate()?;
        estimate(
            self.state0,
            &request,
            self.expectation,
            self.backend,
            &self.config,
        )
        .await
    }
}
