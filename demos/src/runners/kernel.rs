//! Quantum kernel estimation.

use std::time::Instant;

use anyhow::{Context, Result};
use fisherman_hal::Backend;
use fisherman_overlap::{OverlapConfig, OverlapEstimator, ParameterBinding, QuantumState};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Kernel matrix from one backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelResult {
    /// Backend label.
    pub backend: String,
    /// Symmetric matrix of overlaps, row by row.
    pub matrix: Vec<Vec<f64>>,
    /// Wall time of the estimation.
    pub elapsed_ms: u64,
}

impl KernelResult {
    /// Number of data points.
    pub fn size(&self) -> usize {
        self.matrix.len()
    }

    /// Largest distance of a diagonal entry from 1.
    pub fn diagonal_error(&self) -> f64 {
        self.matrix
            .iter()
            .enumerate()
            .map(|(i, row)| (row[i] - 1.0).abs())
            .fold(0.0, f64::max)
    }
}

/// Largest elementwise difference between two kernels of the same size.
pub fn max_deviation(a: &KernelResult, b: &KernelResult) -> f64 {
    a.matrix
        .iter()
        .flatten()
        .zip(b.matrix.iter().flatten())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// Estimates kernels of one feature map over one set of data points.
pub struct KernelRunner {
    feature_map: QuantumState,
    points: ParameterBinding,
    config: OverlapConfig,
}

impl KernelRunner {
    /// Create a runner for `feature_map` evaluated at `points`.
    pub fn new(feature_map: impl Into<QuantumState>, points: ParameterBinding) -> Self {
        Self {
            feature_map: feature_map.into(),
            points,
            config: OverlapConfig::default(),
        }
    }

    /// Set the estimation configuration.
    pub fn with_config(mut self, config: OverlapConfig) -> Self {
        self.config = config;
        self
    }

    /// The feature map.
    pub fn feature_map(&self) -> &QuantumState {
        &self.feature_map
    }

    /// Estimate the kernel, exactly when `backend` is `None`.
    pub async fn run(
        &self,
        label: impl Into<String>,
        backend: Option<&dyn Backend>,
    ) -> Result<KernelResult> {
        let label = label.into();
        let start = Instant::now();

        let mut estimator = OverlapEstimator::new(&self.feature_map)
            .sweep(self.points.clone())
            .with_config(self.config.clone());
        if let Some(backend) = backend {
            estimator = estimator.with_backend(backend);
        }
        let overlap = estimator
            .run()
            .await
            .with_context(|| format!("kernel estimation on {label} failed"))?;
        let m = overlap
            .as_matrix()
            .with_context(|| format!("sweep on {label} returned {overlap:?} instead of a matrix"))?;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(backend = %label, points = m.nrows(), elapsed_ms, "kernel estimated");

        Ok(KernelResult {
            backend: label,
            matrix: m.rows().into_iter().map(|row| row.to_vec()).collect(),
            elapsed_ms,
        })
    }
}
