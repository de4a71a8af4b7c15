//! Simulator backend implementation.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use fisherman_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Counts,
    ExecutionResult, HalError, HalResult, Job, JobId, JobStatus, NoiseProfile, ValidationResult,
};
use fisherman_ir::{Circuit, InstructionKind, IrResult, StandardGate};

use crate::statevector::Statevector;

const DEFAULT_MAX_QUBITS: u32 = 20;

/// How the simulator turns circuits into results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationMode {
    /// Ideal simulation that also exposes exact amplitudes.
    #[default]
    Statevector,
    /// Ideal simulation that only reports sampled counts.
    Shots,
    /// Per-shot trajectories with depolarizing gate noise and readout error.
    Noisy,
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationMode::Statevector => write!(f, "statevector"),
            SimulationMode::Shots => write!(f, "shots"),
            SimulationMode::Noisy => write!(f, "noisy"),
        }
    }
}

impl FromStr for SimulationMode {
    type Err = HalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "statevector" => Ok(SimulationMode::Statevector),
            "shots" => Ok(SimulationMode::Shots),
            "noisy" => Ok(SimulationMode::Noisy),
            other => Err(HalError::Configuration(format!(
                "unknown simulation mode `{other}` (expected statevector, shots or noisy)"
            ))),
        }
    }
}

/// Job data for the simulator.
struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Local simulator backend.
///
/// Runs every circuit of a batch on a statevector. In
/// [`SimulationMode::Statevector`] it advertises exact amplitude access and
/// is classified as an exact backend; the other modes only report counts.
pub struct SimulatorBackend {
    /// Backend configuration.
    config: BackendConfig,
    /// Cached capabilities.
    capabilities: Capabilities,
    /// Active jobs.
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    mode: SimulationMode,
    /// Depolarizing probability per gate operand (noisy mode).
    depolarizing: f64,
    /// Bit-flip probability per measured bit (noisy mode).
    readout_error: f64,
    rng: Mutex<StdRng>,
}

impl SimulatorBackend {
    /// Create an ideal statevector simulator with default settings.
    pub fn new() -> Self {
        Self::build(
            BackendConfig::new("simulator"),
            DEFAULT_MAX_QUBITS,
            SimulationMode::Statevector,
            0.0,
            0.0,
            None,
        )
    }

    /// Create a simulator with custom max qubits.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self::new().max_qubits(max_qubits)
    }

    /// Create an ideal simulator that only reports counts.
    pub fn shots_only() -> Self {
        Self::new().mode(SimulationMode::Shots)
    }

    /// Create a noisy simulator.
    ///
    /// `depolarizing` is the probability that a random Pauli error hits
    /// each operand of a gate, `readout_error` the probability that a
    /// measured bit is flipped.
    pub fn noisy(depolarizing: f64, readout_error: f64) -> Self {
        let mut backend = Self::new().mode(SimulationMode::Noisy);
        backend.depolarizing = depolarizing;
        backend.readout_error = readout_error;
        backend.refresh_capabilities();
        backend
    }

    /// Set the maximum number of qubits.
    #[must_use]
    pub fn max_qubits(mut self, max_qubits: u32) -> Self {
        self.capabilities.num_qubits = max_qubits;
        self
    }

    /// Set the simulation mode.
    #[must_use]
    pub fn mode(mut self, mode: SimulationMode) -> Self {
        self.mode = mode;
        self.refresh_capabilities();
        self
    }

    /// Seed the sampler for reproducible counts.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// The active simulation mode.
    pub fn simulation_mode(&self) -> SimulationMode {
        self.mode
    }

    fn build(
        config: BackendConfig,
        max_qubits: u32,
        mode: SimulationMode,
        depolarizing: f64,
        readout_error: f64,
        seed: Option<u64>,
    ) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let mut backend = Self {
            capabilities: Capabilities::simulator(max_qubits),
            config,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            mode,
            depolarizing,
            readout_error,
            rng: Mutex::new(rng),
        };
        backend.refresh_capabilities();
        backend
    }

    fn refresh_capabilities(&mut self) {
        let max_qubits = self.capabilities.num_qubits;
        let caps = match self.mode {
            SimulationMode::Statevector => Capabilities::simulator(max_qubits),
            SimulationMode::Shots => Capabilities::shot_simulator(max_qubits),
            SimulationMode::Noisy => Capabilities::shot_simulator(max_qubits)
                .with_noise_profile(NoiseProfile::uniform(self.depolarizing, self.readout_error)),
        };
        self.capabilities = caps.with_name(self.config.name.clone());
    }

    fn check_width(&self, circuit: &Circuit) -> HalResult<()> {
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            )));
        }
        Ok(())
    }

    /// Run every circuit of a batch synchronously.
    #[instrument(skip(self, circuits), fields(mode = %self.mode, circuits = circuits.len()))]
    fn run_batch(&self, circuits: &[Circuit], shots: u32) -> IrResult<ExecutionResult> {
        let start = Instant::now();
        let mut guard = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let rng: &mut StdRng = &mut guard;

        let counts = circuits
            .iter()
            .map(|circuit| match self.mode {
                SimulationMode::Noisy => self.run_noisy(circuit, shots, rng),
                SimulationMode::Statevector | SimulationMode::Shots => {
                    run_ideal(circuit, shots, rng)
                }
            })
            .collect::<IrResult<Vec<_>>>()?;

        let elapsed = start.elapsed();
        debug!("Simulation completed in {:?}", elapsed);

        Ok(ExecutionResult::new(counts, shots).with_execution_time(elapsed.as_millis() as u64))
    }

    fn run_noisy(&self, circuit: &Circuit, shots: u32, rng: &mut StdRng) -> IrResult<Counts> {
        let readout = MeasurementMap::of(circuit);
        let mut counts = Counts::new();

        for _ in 0..shots {
            let mut sv = Statevector::new(circuit.num_qubits());
            for inst in circuit.instructions() {
                sv.apply(inst)?;
                if inst.is_gate() && self.depolarizing > 0.0 {
                    for q in &inst.qubits {
                        if rng.r#gen::<f64>() < self.depolarizing {
                            let pauli = match rng.gen_range(0..3) {
                                0 => StandardGate::X,
                                1 => StandardGate::Y,
                                _ => StandardGate::Z,
                            };
                            sv.apply_gate(&pauli, &[q.index()])?;
                        }
                    }
                }
            }
            let outcome = sv.sample(rng);
            counts.insert(readout.bitstring(outcome, self.readout_error, rng), 1);
        }
        Ok(counts)
    }
}

fn run_ideal(circuit: &Circuit, shots: u32, rng: &mut StdRng) -> IrResult<Counts> {
    let sv = Statevector::from_circuit(circuit)?;
    let readout = MeasurementMap::of(circuit);
    let mut counts = Counts::new();
    for outcome in sv.sample_many(rng, shots) {
        counts.insert(readout.bitstring(outcome, 0.0, rng), 1);
    }
    Ok(counts)
}

/// Which qubit lands in which classical bit.
///
/// Measurements are read at the end of the circuit. A circuit without
/// measurements reports every qubit, bit `k` from qubit `k`.
struct MeasurementMap {
    width: usize,
    pairs: Vec<(usize, usize)>,
}

impl MeasurementMap {
    fn of(circuit: &Circuit) -> Self {
        let pairs: Vec<(usize, usize)> = circuit
            .instructions()
            .iter()
            .filter(|inst| matches!(inst.kind, InstructionKind::Measure))
            .map(|inst| (inst.qubits[0].index(), inst.clbits[0].index()))
            .collect();

        if pairs.is_empty() {
            Self {
                width: circuit.num_qubits(),
                pairs: (0..circuit.num_qubits()).map(|q| (q, q)).collect(),
            }
        } else {
            Self {
                width: circuit.num_clbits(),
                pairs,
            }
        }
    }

    fn bitstring(&self, outcome: usize, flip: f64, rng: &mut StdRng) -> String {
        let mut bits = vec![b'0'; self.width];
        for &(qubit, clbit) in &self.pairs {
            let mut bit = (outcome >> qubit) & 1 == 1;
            if flip > 0.0 && rng.r#gen::<f64>() < flip {
                bit = !bit;
            }
            bits[clbit] = if bit { b'1' } else { b'0' };
        }
        bits.into_iter().map(char::from).collect()
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let mut reasons = Vec::new();
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            reasons.push(format!(
                "circuit has {} qubits, simulator supports {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            ));
        }
        let unbound = circuit.parameters();
        if !unbound.is_empty() {
            let names: Vec<_> = unbound.into_iter().collect();
            reasons.push(format!("unbound parameters: {}", names.join(", ")));
        }

        Ok(if reasons.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { reasons }
        })
    }

    #[instrument(skip(self, circuits), fields(circuits = circuits.len()))]
    async fn submit(&self, circuits: &[Circuit], shots: u32) -> HalResult<JobId> {
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} shots requested, simulator accepts 1..={}",
                self.capabilities.max_shots
            )));
        }
        for circuit in circuits {
            self.check_width(circuit)?;
            self.validate(circuit).await?.into_result()?;
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let mut job = Job::new(job_id.clone(), circuits.len(), shots).with_backend(self.name());
        debug!("Submitted job: {}", job_id);

        job.advance(JobStatus::Running);
        let result = match self.run_batch(circuits, shots) {
            Ok(result) => {
                job.advance(JobStatus::Completed);
                Some(result)
            }
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "simulation failed");
                job.advance(JobStatus::Failed(e.to_string()));
                None
            }
        };

        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(job_id.0.clone(), SimJob { job, result });

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let sim_job = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        match (&sim_job.job.status, &sim_job.result) {
            (JobStatus::Completed, Some(result)) => Ok(result.clone()),
            (JobStatus::Failed(msg), _) => Err(HalError::JobFailed(msg.clone())),
            (JobStatus::Cancelled, _) => Err(HalError::JobCancelled),
            (status, _) => Err(HalError::Backend(format!(
                "job {job_id} has no result in state {status}"
            ))),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let sim_job = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        sim_job.job.advance(JobStatus::Cancelled);
        Ok(())
    }

    #[instrument(skip(self, circuit), fields(qubits = circuit.num_qubits()))]
    async fn statevector(&self, circuit: &Circuit) -> HalResult<Vec<Complex64>> {
        if self.mode != SimulationMode::Statevector {
            return Err(HalError::Unsupported(format!(
                "statevector access in {} mode",
                self.mode
            )));
        }
        self.check_width(circuit)?;
        Ok(Statevector::from_circuit(circuit)?.into_amplitudes())
    }
}

impl BackendFactory for SimulatorBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_qubits = config
            .get_u64("max_qubits")?
            .map_or(DEFAULT_MAX_QUBITS, |v| v as u32);
        let mode = config
            .get_str("mode")?
            .map(SimulationMode::from_str)
            .transpose()?
            .unwrap_or_default();
        let seed = config.get_u64("seed")?;
        let depolarizing = probability(&config, "depolarizing")?;
        let readout_error = probability(&config, "readout_error")?;

        if mode != SimulationMode::Noisy && (depolarizing > 0.0 || readout_error > 0.0) {
            warn!(%mode, "noise settings are ignored outside noisy mode");
        }

        Ok(Self::build(
            config,
            max_qubits,
            mode,
            depolarizing,
            readout_error,
            seed,
        ))
    }
}

fn probability(config: &BackendConfig, key: &str) -> HalResult<f64> {
    let p = config.get_f64(key)?.unwrap_or(0.0);
    if !(0.0..=1.0).contains(&p) {
        return Err(HalError::Configuration(format!(
            "`{key}` must be a probability in [0, 1], got {p}"
        )));
    }
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fisherman_ir::{ParameterExpression, QubitId};
    use std::time::Duration;

    fn measured(mut circuit: Circuit) -> Circuit {
        circuit.measure_all().unwrap();
        circuit
    }

    #[tokio::test]
    async fn test_simulator_capabilities() {
        let backend = SimulatorBackend::new();
        let caps = backend.capabilities();

        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 20);
        assert!(caps.is_exact());
        assert!(backend.availability().await.unwrap().is_available);
    }

    #[test]
    fn test_mode_classification() {
        assert!(!SimulatorBackend::shots_only().capabilities().is_exact());
        assert!(!SimulatorBackend::noisy(0.01, 0.01).capabilities().is_exact());
        assert_eq!(SimulatorBackend::with_max_qubits(7).capabilities().num_qubits, 7);
    }

    #[tokio::test]
    async fn test_simulator_bell_state() {
        let backend = SimulatorBackend::new().with_seed(1);

        let circuit = measured(Circuit::bell().unwrap());
        let job_id = backend.submit(&[circuit], 1000).await.unwrap();

        let status = backend.status(&job_id).await.unwrap();
        assert!(status.is_success());

        let result = backend.result(&job_id).await.unwrap();
        assert_eq!(result.shots, 1000);
        assert_eq!(result.len(), 1);

        let counts = &result.counts[0];
        assert_eq!(counts.get("00") + counts.get("11"), 1000);
        assert_eq!(counts.get("01") + counts.get("10"), 0);
    }

    #[tokio::test]
    async fn test_batch_returns_one_table_per_circuit() {
        let backend = SimulatorBackend::shots_only().with_seed(3);
        let circuits = vec![
            measured(Circuit::ghz(3).unwrap()),
            measured(Circuit::basis_state(3, 0b101).unwrap()),
        ];
        let job_id = backend.submit(&circuits, 500).await.unwrap();
        let result = backend.wait(&job_id, Duration::from_millis(1)).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.counts[0].get("000") + result.counts[0].get("111"), 500);
        // little-endian: qubit 0 is the first character
        assert_eq!(result.counts[1].get("101"), 500);
    }

    #[tokio::test]
    async fn test_unmeasured_circuit_reports_all_qubits() {
        let backend = SimulatorBackend::new();
        let job_id = backend
            .submit(&[Circuit::basis_state(2, 0b10).unwrap()], 10)
            .await
            .unwrap();
        let result = backend.result(&job_id).await.unwrap();
        assert_eq!(result.counts[0].get("01"), 10);
    }

    #[tokio::test]
    async fn test_seeded_runs_are_reproducible() {
        let circuit = measured(Circuit::ghz(4).unwrap());
        let a = SimulatorBackend::new().with_seed(99);
        let b = SimulatorBackend::new().with_seed(99);

        let ra = a.result(&a.submit(&[circuit.clone()], 200).await.unwrap()).await.unwrap();
        let rb = b.result(&b.submit(&[circuit], 200).await.unwrap()).await.unwrap();
        assert_eq!(ra.counts, rb.counts);
    }

    #[tokio::test]
    async fn test_noisy_simulator_leaks_probability() {
        let backend = SimulatorBackend::noisy(0.2, 0.1).with_seed(5);
        let circuit = measured(Circuit::basis_state(2, 0).unwrap());
        let mut cu = Circuit::ghz(2).unwrap();
        cu.barrier_all().unwrap();
        cu.compose(&Circuit::ghz(2).unwrap().inverse().unwrap()).unwrap();
        let cu = measured(cu);

        let job_id = backend.submit(&[circuit, cu], 2000).await.unwrap();
        let result = backend.result(&job_id).await.unwrap();

        // readout error alone flips at least one of two bits ~19% of the time
        let p0 = result.counts[0].probability("00");
        assert!(p0 < 0.9 && p0 > 0.7, "p0 = {p0}");
        assert!(result.counts[1].probability("00") < 0.9);
    }

    #[tokio::test]
    async fn test_simulator_too_many_qubits() {
        let backend = SimulatorBackend::with_max_qubits(5);

        let circuit = Circuit::with_size("test", 10, 0);
        let result = backend.submit(&[circuit], 100).await;

        assert!(matches!(result, Err(HalError::CircuitTooLarge(_))));
    }

    #[tokio::test]
    async fn test_invalid_shots() {
        let backend = SimulatorBackend::new();
        let circuit = Circuit::bell().unwrap();
        assert!(matches!(
            backend.submit(&[circuit.clone()], 0).await,
            Err(HalError::InvalidShots(_))
        ));
        assert!(matches!(
            backend.submit(&[circuit], 1_000_000).await,
            Err(HalError::InvalidShots(_))
        ));
    }

    #[tokio::test]
    async fn test_unbound_parameters_rejected() {
        let backend = SimulatorBackend::new();
        let mut circuit = Circuit::new("ansatz", 1);
        circuit
            .ry(ParameterExpression::symbol("theta"), QubitId(0))
            .unwrap();

        let verdict = backend.validate(&circuit).await.unwrap();
        assert!(!verdict.is_valid());
        assert!(matches!(
            backend.submit(&[circuit], 10).await,
            Err(HalError::InvalidCircuit(msg)) if msg.contains("theta")
        ));
    }

    #[tokio::test]
    async fn test_statevector_access() {
        let backend = SimulatorBackend::new();
        let amps = backend.statevector(&Circuit::bell().unwrap()).await.unwrap();
        assert_eq!(amps.len(), 4);
        assert!((amps[0].norm_sqr() - 0.5).abs() < 1e-12);
        assert!((amps[3].norm_sqr() - 0.5).abs() < 1e-12);

        let shots = SimulatorBackend::shots_only();
        assert!(matches!(
            shots.statevector(&Circuit::bell().unwrap()).await,
            Err(HalError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_after_completion_keeps_result() {
        let backend = SimulatorBackend::new();
        let job_id = backend.submit(&[Circuit::bell().unwrap()], 10).await.unwrap();
        backend.cancel(&job_id).await.unwrap();
        assert_eq!(backend.status(&job_id).await.unwrap(), JobStatus::Completed);
        assert!(matches!(
            backend.cancel(&JobId::new("missing")).await,
            Err(HalError::JobNotFound(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = BackendConfig::new("noisy-sim")
            .with_extra("max_qubits", serde_json::json!(8))
            .with_extra("mode", serde_json::json!("noisy"))
            .with_extra("seed", serde_json::json!(11))
            .with_extra("depolarizing", serde_json::json!(0.02))
            .with_extra("readout_error", serde_json::json!(0.03));

        let backend = SimulatorBackend::from_config(config).unwrap();
        assert_eq!(backend.name(), "noisy-sim");
        assert_eq!(backend.simulation_mode(), SimulationMode::Noisy);
        let caps = backend.capabilities();
        assert_eq!(caps.num_qubits, 8);
        assert_eq!(caps.name, "noisy-sim");
        let noise = caps.noise_profile.as_ref().unwrap();
        assert!((noise.readout_error() - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_from_config_rejects_bad_values() {
        let bad_mode = BackendConfig::new("sim").with_extra("mode", serde_json::json!("magic"));
        assert!(matches!(
            SimulatorBackend::from_config(bad_mode),
            Err(HalError::Configuration(_))
        ));

        let bad_p = BackendConfig::new("sim").with_extra("depolarizing", serde_json::json!(1.5));
        assert!(matches!(
            SimulatorBackend::from_config(bad_p),
            Err(HalError::Configuration(_))
        ));
    }
}
