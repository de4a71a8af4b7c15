//! Backend trait and configuration.
//!
//! The [`Backend`] trait defines the lifecycle of a batch job:
//!
//! ```text
//!   capabilities() ──→ validate() ──→ submit() ──→ status() ──→ result()
//!    (sync, &ref)       (async)       (async)      (async)      (async)
//! ```
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `capabilities()` | sync | yes | `&Capabilities` |
//! | `availability()` | async | yes | `HalResult<BackendAvailability>` |
//! | `validate()` | async | yes | `HalResult<ValidationResult>` |
//! | `submit()` | async | yes | `HalResult<JobId>` |
//! | `status()` | async | yes | `HalResult<JobStatus>` |
//! | `result()` | async | yes | `HalResult<ExecutionResult>` |
//! | `cancel()` | async | yes | `HalResult<()>` |
//! | `wait()` | async | provided | `HalResult<ExecutionResult>` |
//! | `statevector()` | async | provided | `HalResult<Vec<Complex64>>` |

use std::time::Duration;

use async_trait::async_trait;
use fisherman_ir::Circuit;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// Configuration for a backend instance.
///
/// Backend-specific keys live in `extra`, e.g. the simulator reads
/// `max_qubits`, `mode`, `seed`, `depolarizing` and `readout_error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Name of the backend.
    pub name: String,
    /// Additional configuration.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    /// Create a new backend configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Add extra configuration.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Read an unsigned integer key.
    pub fn get_u64(&self, key: &str) -> HalResult<Option<u64>> {
        self.typed(key, serde_json::Value::as_u64, "an unsigned integer")
    }

    /// Read a floating-point key.
    pub fn get_f64(&self, key: &str) -> HalResult<Option<f64>> {
        self.typed(key, serde_json::Value::as_f64, "a number")
    }

    /// Read a string key.
    pub fn get_str(&self, key: &str) -> HalResult<Option<&str>> {
        self.typed(key, serde_json::Value::as_str, "a string")
    }

    fn typed<'a, T>(
        &'a self,
        key: &str,
        read: impl Fn(&'a serde_json::Value) -> Option<T>,
        expected: &str,
    ) -> HalResult<Option<T>> {
        match self.extra.get(key) {
            None => Ok(None),
            Some(value) => read(value).map(Some).ok_or_else(|| {
                HalError::Configuration(format!("`{key}` must be {expected}, got {value}"))
            }),
        }
    }
}

/// Trait for execution backends.
///
/// - `capabilities()` is synchronous and infallible; implementations cache
///   it at construction time.
/// - `submit()` takes a whole batch and returns a job in `Queued` state.
/// - `result()` returns one histogram per submitted circuit, in order.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the capabilities of this backend.
    fn capabilities(&self) -> &Capabilities;

    /// Check backend availability.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Validate a circuit against backend constraints.
    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult>;

    /// Submit a batch of measured circuits, each run for `shots` shots.
    async fn submit(&self, circuits: &[Circuit], shots: u32) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Get the result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Cancel a running job.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Wait for a job to reach a terminal state and return its result.
    ///
    /// Polls `status()` every `poll_interval` without a deadline; callers
    /// that need one wrap this in `tokio::time::timeout`.
    async fn wait(&self, job_id: &JobId, poll_interval: Duration) -> HalResult<ExecutionResult> {
        loop {
            match self.status(job_id).await? {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                status @ (JobStatus::Queued | JobStatus::Running) => {
                    trace!(job_id = %job_id, %status, "job pending");
                    tokio::time::sleep(poll_interval).await;
                }
            }
        }
    }

    /// Exact amplitudes of the state `circuit` prepares from `|0…0⟩`.
    ///
    /// Index `i` of the returned vector holds the amplitude of the basis
    /// state whose bit `k` is qubit `k`. Only backends advertising the
    /// `"statevector"` feature override this.
    async fn statevector(&self, _circuit: &Circuit) -> HalResult<Vec<Complex64>> {
        Err(HalError::Unsupported(format!(
            "{} does not expose statevectors",
            self.name()
        )))
    }
}

/// Backend availability information.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub is_available: bool,
    /// Number of jobs currently in queue (if known).
    pub queue_depth: Option<u32>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Availability of a local backend with no queue.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            status_message: None,
        }
    }

    /// Create availability for an offline backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            status_message: Some(reason.into()),
        }
    }
}

/// Result of circuit validation against backend constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Circuit can be submitted as-is.
    Valid,
    /// Circuit cannot run on this backend.
    Invalid {
        /// Reasons the circuit is invalid.
        reasons: Vec<String>,
    },
}

impl ValidationResult {
    /// Check if the circuit is valid.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Turn an `Invalid` verdict into [`HalError::InvalidCircuit`].
    pub fn into_result(self) -> HalResult<()> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid { reasons } => {
                Err(HalError::InvalidCircuit(reasons.join("; ")))
            }
        }
    }
}

/// Trait for creating backends from configuration.
pub trait BackendFactory: Backend + Sized {
    /// Create a backend from configuration.
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}
