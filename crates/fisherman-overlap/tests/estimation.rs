//! End-to-end overlap estimation against local and stub backends.

use std::f64::consts::PI;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use fisherman_adapter_sim::SimulatorBackend;
use fisherman_hal::{
    Backend, BackendAvailability, Capabilities, Counts, ExecutionResult, HalError, HalResult,
    JobId, JobStatus, ValidationResult,
};
use fisherman_ir::{Circuit, IrError, ParameterExpression, QubitId};
use fisherman_overlap::{
    BasisChange, Candidates, Overlap, OverlapConfig, OverlapError, OverlapEstimator,
    ParameterBinding, QuantumState, compute_uncompute_overlap,
};

/// Delegates to a simulator and counts every call made through the trait.
struct RecordingBackend {
    inner: SimulatorBackend,
    calls: AtomicUsize,
    submitted: Mutex<Vec<(usize, u32)>>,
}

impl RecordingBackend {
    fn new(inner: SimulatorBackend) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn capabilities(&self) -> &Capabilities {
        self.record();
        self.inner.capabilities()
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        self.record();
        self.inner.availability().await
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        self.record();
        self.inner.validate(circuit).await
    }

    async fn submit(&self, circuits: &[Circuit], shots: u32) -> HalResult<JobId> {
        self.record();
        self.submitted.lock().unwrap().push((circuits.len(), shots));
        self.inner.submit(circuits, shots).await
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.record();
        self.inner.status(job_id).await
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.record();
        self.inner.result(job_id).await
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.record();
        self.inner.cancel(job_id).await
    }

    async fn statevector(&self, circuit: &Circuit) -> HalResult<Vec<num_complex::Complex64>> {
        self.record();
        self.inner.statevector(circuit).await
    }
}

/// Hardware-like backend that answers every job with fixed count tables.
struct CannedBackend {
    capabilities: Capabilities,
    tables: Vec<Counts>,
    fail: bool,
    shots: Mutex<Option<u32>>,
}

impl CannedBackend {
    fn new(tables: Vec<Counts>) -> Self {
        Self {
            capabilities: Capabilities::hardware("canned", 4, 1000),
            tables,
            fail: false,
            shots: Mutex::new(None),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(vec![])
        }
    }
}

#[async_trait]
impl Backend for CannedBackend {
    fn name(&self) -> &str {
        "canned"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, _circuit: &Circuit) -> HalResult<ValidationResult> {
        Ok(ValidationResult::Valid)
    }

    async fn submit(&self, _circuits: &[Circuit], shots: u32) -> HalResult<JobId> {
        *self.shots.lock().unwrap() = Some(shots);
        Ok(JobId::new("canned-1"))
    }

    async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
        Ok(if self.fail {
            JobStatus::Failed("calibration drift".into())
        } else {
            JobStatus::Completed
        })
    }

    async fn result(&self, _job_id: &JobId) -> HalResult<ExecutionResult> {
        Ok(ExecutionResult::new(self.tables.clone(), 1000))
    }

    async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
        Ok(())
    }
}

fn basis(num_qubits: u32, index: u64) -> QuantumState {
    Circuit::basis_state(num_qubits, index).unwrap().into()
}

fn ry(theta: f64) -> QuantumState {
    let mut c = Circuit::new("ry", 2);
    c.ry(theta, QubitId(0))
        .unwrap()
        .cx(QubitId(0), QubitId(1))
        .unwrap();
    c.into()
}

fn ansatz() -> QuantumState {
    let mut c = Circuit::new("ansatz", 2);
    c.ry(ParameterExpression::symbol("theta"), QubitId(0))
        .unwrap()
        .cx(QubitId(0), QubitId(1))
        .unwrap()
        .rz(ParameterExpression::symbol("phi"), QubitId(1))
        .unwrap();
    c.into()
}

fn seeded_shots() -> SimulatorBackend {
    SimulatorBackend::shots_only().with_seed(1234)
}

#[tokio::test]
async fn test_both_inputs_rejected_before_backend_work() {
    let backend = RecordingBackend::new(SimulatorBackend::new());
    let result = compute_uncompute_overlap(
        &ansatz(),
        Some(basis(2, 0).into()),
        Some(ParameterBinding::new().with("theta", [0.0])),
        None,
        Some(&backend),
    )
    .await;

    assert!(matches!(result, Err(OverlapError::InvalidArgumentCombination)));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_builder_rejects_both_inputs() {
    let backend = RecordingBackend::new(seeded_shots());
    let state = ansatz();
    let result = OverlapEstimator::new(&state)
        .against(basis(2, 0))
        .sweep(ParameterBinding::new().with("theta", [0.0]))
        .with_backend(&backend)
        .run()
        .await;

    assert!(matches!(result, Err(OverlapError::InvalidArgumentCombination)));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_self_overlap_exact_and_sampled() {
    let state = QuantumState::from(Circuit::ghz(3).unwrap());

    let exact = compute_uncompute_overlap(&state, None, None, None, None)
        .await
        .unwrap();
    assert!((exact.as_scalar().unwrap() - 1.0).abs() < 1e-10);

    let backend = seeded_shots();
    let sampled = compute_uncompute_overlap(&state, None, None, None, Some(&backend))
        .await
        .unwrap();
    assert_eq!(sampled, Overlap::Scalar(1.0));
}

#[tokio::test]
async fn test_orthogonal_states() {
    let zero = basis(3, 0);
    let one = basis(3, 1);

    let exact = compute_uncompute_overlap(&zero, Some(one.clone().into()), None, None, None)
        .await
        .unwrap();
    assert_eq!(exact.as_scalar(), Some(0.0));

    let backend = seeded_shots();
    let sampled = compute_uncompute_overlap(&zero, Some(one.into()), None, None, Some(&backend))
        .await
        .unwrap();
    assert_eq!(sampled.as_scalar(), Some(0.0));
}

#[tokio::test]
async fn test_list_mode() {
    let zero = basis(2, 0);
    let candidates = Candidates::Many(vec![zero.clone(), basis(2, 2)]);

    let exact = compute_uncompute_overlap(&zero, Some(candidates.clone()), None, None, None)
        .await
        .unwrap();
    let values = exact.as_vector().unwrap();
    assert!((values[0] - 1.0).abs() < 1e-12);
    assert!(values[1].abs() < 1e-12);

    let backend = RecordingBackend::new(seeded_shots());
    let sampled = compute_uncompute_overlap(&zero, Some(candidates), None, None, Some(&backend))
        .await
        .unwrap();
    assert_eq!(sampled, Overlap::Vector(vec![1.0, 0.0]));
    assert_eq!(*backend.submitted.lock().unwrap(), [(2, 8192)]);
}

#[tokio::test]
async fn test_two_point_sweep() {
    let sweep = ParameterBinding::new()
        .with("theta", [0.3, 1.9])
        .with("phi", [0.0, 0.7]);

    let backend = RecordingBackend::new(seeded_shots());
    let sampled = compute_uncompute_overlap(&ansatz(), None, Some(sweep.clone()), None, Some(&backend))
        .await
        .unwrap();
    let exact = compute_uncompute_overlap(&ansatz(), None, Some(sweep), None, None)
        .await
        .unwrap();

    for overlap in [&sampled, &exact] {
        let m = overlap.as_matrix().unwrap();
        assert_eq!(m.shape(), &[2, 2]);
        assert_eq!(m[[0, 1]], m[[1, 0]]);
        assert!((m[[0, 0]] - 1.0).abs() < 1e-10);
        assert!((m[[1, 1]] - 1.0).abs() < 1e-10);
    }

    // one batch of n(n+1)/2 circuits
    assert_eq!(*backend.submitted.lock().unwrap(), [(3, 8192)]);
}

#[tokio::test]
async fn test_sampling_agrees_with_exact() {
    let state0 = ry(0.0);
    let candidates: Vec<_> = [0.4, 1.2, 2.0, 2.8].into_iter().map(ry).collect();

    let exact = compute_uncompute_overlap(
        &state0,
        Some(candidates.clone().into()),
        None,
        None,
        None,
    )
    .await
    .unwrap();

    let backend = seeded_shots();
    let sampled = OverlapEstimator::new(&state0)
        .against_all(candidates)
        .with_backend(&backend)
        .with_config(OverlapConfig::default().with_shots(8192))
        .run()
        .await
        .unwrap();

    for (e, s) in exact.values().iter().zip(sampled.values()) {
        assert!((e - s).abs() < 0.02, "exact {e} vs sampled {s}");
    }
}

#[tokio::test]
async fn test_exact_backend_matches_pure_evaluation() {
    let sweep = ParameterBinding::new()
        .with("theta", [0.1, 0.9, 2.2])
        .with("phi", [0.5, 0.0, PI]);

    let backend = RecordingBackend::new(SimulatorBackend::new());
    let with_backend =
        compute_uncompute_overlap(&ansatz(), None, Some(sweep.clone()), None, Some(&backend))
            .await
            .unwrap();
    let pure = compute_uncompute_overlap(&ansatz(), None, Some(sweep), None, None)
        .await
        .unwrap();

    for (a, b) in with_backend.values().iter().zip(pure.values()) {
        assert!((a - b).abs() < 1e-12);
    }
    // exact mode never submits jobs
    assert!(backend.submitted.lock().unwrap().is_empty());
    assert!(backend.calls() > 0);
}

#[tokio::test]
async fn test_basis_change_leaves_overlaps_unchanged() {
    let mut rotation = Circuit::new("rotation", 2);
    rotation
        .h(QubitId(0))
        .unwrap()
        .rzz(0.8, QubitId(0), QubitId(1))
        .unwrap();
    let transform = BasisChange::new(rotation).unwrap();

    let state0 = ry(0.6);
    let plain = OverlapEstimator::new(&state0)
        .against(ry(1.7))
        .run()
        .await
        .unwrap();
    let rotated = OverlapEstimator::new(&state0)
        .against(ry(1.7))
        .with_expectation(&transform)
        .run()
        .await
        .unwrap();

    assert!((plain.as_scalar().unwrap() - rotated.as_scalar().unwrap()).abs() < 1e-12);
}

#[tokio::test]
async fn test_noisy_backend_stays_in_range() {
    let backend = SimulatorBackend::noisy(0.02, 0.01).with_seed(99);
    let state = QuantumState::from(Circuit::bell().unwrap());
    let overlap = OverlapEstimator::new(&state)
        .against_all([state.clone(), basis(2, 3)])
        .with_backend(&backend)
        .with_config(OverlapConfig::default().with_shots(2000))
        .run()
        .await
        .unwrap();

    let values = overlap.as_vector().unwrap();
    assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
    assert!(values[0] > 0.8);
    assert!(values[1] < 0.7);
}

#[tokio::test]
async fn test_amplitude_state_not_preparable_when_sampling() {
    let backend = seeded_shots();
    let amplitudes = QuantumState::from(fisherman_adapter_sim::Statevector::new(2));
    let result = compute_uncompute_overlap(
        &basis(2, 0),
        Some(amplitudes.into()),
        None,
        None,
        Some(&backend),
    )
    .await;
    assert!(matches!(result, Err(OverlapError::NotPreparable(_))));
}

#[tokio::test]
async fn test_shots_capped_to_backend_limit() {
    let zeros: Counts = [("00".to_string(), 1000u64)].into_iter().collect();
    let backend = CannedBackend::new(vec![zeros]);
    let state = basis(2, 0);
    let overlap = OverlapEstimator::new(&state)
        .with_backend(&backend)
        .with_config(OverlapConfig::default().with_shots(50_000))
        .run()
        .await
        .unwrap();
    assert_eq!(overlap, Overlap::Scalar(1.0));
    assert_eq!(*backend.shots.lock().unwrap(), Some(1000));
}

#[tokio::test]
async fn test_counts_mismatch() {
    let zeros: Counts = [("00".to_string(), 1000u64)].into_iter().collect();
    let backend = CannedBackend::new(vec![zeros]);
    let state = basis(2, 0);
    let result = OverlapEstimator::new(&state)
        .against_all([basis(2, 1), basis(2, 2)])
        .with_backend(&backend)
        .run()
        .await;
    assert!(matches!(
        result,
        Err(OverlapError::CountsMismatch { expected: 2, got: 1 })
    ));
}

#[tokio::test]
async fn test_missing_zero_outcome_is_zero() {
    let tables = vec![
        [("01".to_string(), 600u64), ("11".to_string(), 400)]
            .into_iter()
            .collect(),
        Counts::new(),
    ];
    let backend = CannedBackend::new(tables);
    let state = basis(2, 0);
    let overlap = OverlapEstimator::new(&state)
        .against_all([basis(2, 1), basis(2, 3)])
        .with_backend(&backend)
        .run()
        .await
        .unwrap();
    assert_eq!(overlap, Overlap::Vector(vec![0.0, 0.0]));
}

#[tokio::test]
async fn test_backend_failure_propagates() {
    let backend = CannedBackend::failing();
    let state = basis(2, 0);
    let result = OverlapEstimator::new(&state)
        .with_backend(&backend)
        .run()
        .await;
    assert!(matches!(
        result,
        Err(OverlapError::Backend(HalError::JobFailed(msg))) if msg == "calibration drift"
    ));
}

#[tokio::test]
async fn test_mismatched_sweep_lengths() {
    let sweep = ParameterBinding::new()
        .with("theta", [0.1, 0.2])
        .with("phi", [0.0]);
    let result = compute_uncompute_overlap(&ansatz(), None, Some(sweep), None, None).await;
    assert!(matches!(result, Err(OverlapError::Circuit(_))));
}

#[tokio::test]
async fn test_preparation_with_extra_classical_bits() {
    let mut prep = Circuit::with_size("with_creg", 2, 3);
    prep.h(QubitId(0))
        .unwrap()
        .cx(QubitId(0), QubitId(1))
        .unwrap();
    let state = QuantumState::from(prep);
    let other = ry(1.1);

    let exact = compute_uncompute_overlap(&state, None, None, None, None)
        .await
        .unwrap();
    let backend = SimulatorBackend::shots_only().with_seed(1);
    let sampled = compute_uncompute_overlap(&state, None, None, None, Some(&backend))
        .await
        .unwrap();
    assert!((exact.as_scalar().unwrap() - 1.0).abs() < 1e-10);
    assert_eq!(sampled, Overlap::Scalar(1.0));

    let exact = compute_uncompute_overlap(&state, Some(other.clone().into()), None, None, None)
        .await
        .unwrap();
    let sampled =
        compute_uncompute_overlap(&state, Some(other.into()), None, None, Some(&backend))
            .await
            .unwrap();
    let (e, s) = (exact.as_scalar().unwrap(), sampled.as_scalar().unwrap());
    assert!(e > 0.1);
    assert!((e - s).abs() < 0.02, "exact {e} vs sampled {s}");
}

#[tokio::test]
async fn test_too_wide_for_exact_evaluation() {
    let wide = QuantumState::from(Circuit::new("wide", 64));
    let result = compute_uncompute_overlap(&wide, None, None, None, None).await;
    assert!(matches!(
        result,
        Err(OverlapError::Circuit(IrError::TooManyQubits { num_qubits: 64, .. }))
    ));
}

#[tokio::test]
async fn test_sampled_sweep_matches_exact_entrywise() {
    let sweep = ParameterBinding::new()
        .with("theta", [0.2, 1.0, 1.9, 2.7])
        .with("phi", [0.0, 0.6, 1.4, 2.5]);

    let exact = compute_uncompute_overlap(&ansatz(), None, Some(sweep.clone()), None, None)
        .await
        .unwrap();
    let state = ansatz();
    let backend = seeded_shots();
    let sampled = OverlapEstimator::new(&state)
        .sweep(sweep)
        .with_backend(&backend)
        .with_config(OverlapConfig::default().with_shots(8192))
        .run()
        .await
        .unwrap();

    let exact = exact.as_matrix().unwrap();
    let sampled = sampled.as_matrix().unwrap();
    assert_eq!(sampled.shape(), &[4, 4]);
    for i in 0..4 {
        for j in 0..4 {
            let (e, s) = (exact[[i, j]], sampled[[i, j]]);
            assert!((e - s).abs() < 0.02, "entry ({i}, {j}): exact {e} vs sampled {s}");
        }
    }
    // off-diagonal entries differ enough that a misplaced triangle entry shows up
    assert!((exact[[0, 1]] - exact[[0, 3]]).abs() > 0.1);
}

#[tokio::test]
async fn test_invalid_config_rejected_before_submission() {
    let backend = RecordingBackend::new(seeded_shots());
    let state = basis(2, 0);
    let config = OverlapConfig {
        poll_interval_ms: 0,
        ..OverlapConfig::default()
    };
    let result = OverlapEstimator::new(&state)
        .with_backend(&backend)
        .with_config(config)
        .run()
        .await;
    assert!(matches!(result, Err(OverlapError::Config(_))));
    assert!(backend.submitted.lock().unwrap().is_empty());
}
