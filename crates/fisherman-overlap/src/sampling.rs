//! Sampling evaluation through compute-uncompute circuits.
//!
//! For each pair `(a, b)` the circuit `prep(a) · barrier · prep(b)† · measure`
//! is run on the backend. The all-zero outcome occurs with probability
//! |⟨b|a⟩|², so its frequency estimates the overlap.

use fisherman_hal::{Backend, Counts};
use fisherman_ir::Circuit;
use tracing::{debug, instrument, warn};

use crate::binding::ParameterBinding;
use crate::config::OverlapConfig;
use crate::error::{OverlapError, OverlapResult};
use crate::mode::{Candidates, OverlapRequest};
use crate::result::{Overlap, sym_from_triu, upper_triangle};
use crate::state::QuantumState;

/// Build the compute-uncompute circuit for `s0` against `s1`.
///
/// Both states must have preparation circuits on the same number of qubits.
pub fn cu_circuit(s0: &QuantumState, s1: &QuantumState) -> OverlapResult<Circuit> {
    s1.ensure_width(s0.num_qubits())?;
    let prep0 = s0.preparation()?;
    let prep1 = s1.preparation()?;

    let mut circuit = prep0
        .clone()
        .with_name(format!("cu[{}|{}]", prep0.name(), prep1.name()));
    circuit.barrier_all()?;
    circuit.compose(&prep1.inverse()?)?;
    circuit.measure_all()?;
    Ok(circuit)
}

/// Fraction of shots that read `0` on every one of `num_clbits` bits.
///
/// `num_clbits` is the register width of the executed circuit, which can
/// exceed its qubit count when a preparation carries its own classical bits.
/// An empty table gives 0.0.
pub fn zero_probability(counts: &Counts, num_clbits: usize) -> f64 {
    counts.probability(&"0".repeat(num_clbits))
}

/// Estimate `request` by running compute-uncompute circuits on `backend`.
#[instrument(skip_all, fields(backend = backend.name(), request = %request))]
pub async fn evaluate_sampling(
    state0: &QuantumState,
    request: &OverlapRequest,
    backend: &dyn Backend,
    config: &OverlapConfig,
) -> OverlapResult<Overlap> {
    match request {
        OverlapRequest::SelfOverlap => {
            let circuit = cu_circuit(state0, state0)?;
            let estimates = run_batch(vec![circuit], backend, config).await?;
            Ok(Overlap::Scalar(estimates[0]))
        }
        OverlapRequest::Against(candidates) => {
            let circuits = candidates_circuits(state0, candidates)?;
            let estimates = run_batch(circuits, backend, config).await?;
            Ok(match candidates {
                Candidates::One(_) => Overlap::Scalar(estimates[0]),
                Candidates::Many(_) => Overlap::Vector(estimates),
            })
        }
        OverlapRequest::Sweep(binding) => sweep(state0, binding, backend, config).await,
    }
}

fn candidates_circuits(
    state0: &QuantumState,
    candidates: &Candidates,
) -> OverlapResult<Vec<Circuit>> {
    match candidates {
        Candidates::One(state) => Ok(vec![cu_circuit(state0, state)?]),
        Candidates::Many(states) => states.iter().map(|s| cu_circuit(state0, s)).collect(),
    }
}

async fn sweep(
    state0: &QuantumState,
    binding: &ParameterBinding,
    backend: &dyn Backend,
    config: &OverlapConfig,
) -> OverlapResult<Overlap> {
    let states = binding.bind(state0)?;
    let n = states.len();
    let circuits = upper_triangle(n)
        .map(|(i, j)| cu_circuit(&states[i], &states[j]))
        .collect::<OverlapResult<Vec<_>>>()?;
    let estimates = run_batch(circuits, backend, config).await?;
    Ok(Overlap::Matrix(sym_from_triu(&estimates, n)?))
}

/// Submit `circuits` as one job and turn each count table into an estimate.
async fn run_batch(
    circuits: Vec<Circuit>,
    backend: &dyn Backend,
    config: &OverlapConfig,
) -> OverlapResult<Vec<f64>> {
    if circuits.is_empty() {
        return Ok(Vec::new());
    }

    let max_shots = backend.capabilities().max_shots;
    let shots = config.shots.min(max_shots);
    if shots < config.shots {
        warn!(
            requested = config.shots,
            max_shots, "shot count capped by backend"
        );
    }

    debug!(circuits = circuits.len(), shots, "submitting batch");
    let job_id = backend.submit(&circuits, shots).await?;
    let result = backend.wait(&job_id, config.poll_interval()).await?;

    if result.counts.len() != circuits.len() {
        return Err(OverlapError::CountsMismatch {
            expected: circuits.len(),
            got: result.counts.len(),
        });
    }

    Ok(circuits
        .iter()
        .zip(&result.counts)
        .map(|(circuit, counts)| zero_probability(counts, circuit.num_clbits()))
        .collect())
}
