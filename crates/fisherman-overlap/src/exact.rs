//! Exact evaluation from amplitudes.

use fisherman_hal::Backend;
use tracing::{debug, instrument};

use crate::error::OverlapResult;
use crate::expression::{CircuitSampler, Observable, ValueTransform};
use crate::mode::{Candidates, OverlapRequest};
use crate::result::Overlap;
use crate::state::QuantumState;

/// Build the observable for `request` against `state0`.
pub fn observable(state0: &QuantumState, request: &OverlapRequest) -> OverlapResult<Observable> {
    Ok(match request {
        OverlapRequest::SelfOverlap => Observable::Single {
            bra: state0.clone(),
            ket: state0.clone(),
        },
        OverlapRequest::Against(Candidates::One(state)) => {
            state.ensure_width(state0.num_qubits())?;
            Observable::Single {
                bra: state0.clone(),
                ket: state.clone(),
            }
        }
        OverlapRequest::Against(Candidates::Many(states)) => {
            for state in states {
                state.ensure_width(state0.num_qubits())?;
            }
            Observable::Row {
                bra: state0.clone(),
                kets: states.clone(),
            }
        }
        OverlapRequest::Sweep(binding) => Observable::Gram {
            states: binding.bind(state0)?,
        },
    })
}

/// Compute `request` exactly.
///
/// `expectation` rewrites the observable first. With a backend, prepared
/// states are replaced by the amplitudes the backend reports; without one
/// they are simulated locally.
#[instrument(skip_all, fields(request = %request))]
pub async fn evaluate_exact(
    state0: &QuantumState,
    request: &OverlapRequest,
    expectation: Option<&dyn ValueTransform>,
    backend: Option<&dyn Backend>,
) -> OverlapResult<Overlap> {
    let mut observable = observable(state0, request)?;

    if let Some(transform) = expectation {
        debug!(transform = transform.name(), "applying value transform");
        observable = transform.convert(observable)?;
    }
    if let Some(backend) = backend {
        observable = CircuitSampler::new(backend).convert(observable).await?;
    }

    Ok(observable.evaluate()?.squared_magnitude())
}
