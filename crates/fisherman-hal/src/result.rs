//! Measurement results.
//!
//! Bitstrings are little-endian: character `k` is the outcome of qubit `k`,
//! so the all-zero outcome of an `n`-qubit circuit is `"0"` repeated `n`
//! times regardless of ordering convention.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Histogram of measured bitstrings for one circuit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts(BTreeMap<String, u64>);

impl Counts {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` observations of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.0.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Observations of `bitstring`, zero if never seen.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.0.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of observations.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Relative frequency of `bitstring`; `0.0` for an empty histogram.
    pub fn probability(&self, bitstring: &str) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.get(bitstring) as f64 / total as f64,
        }
    }

    /// The most frequently observed bitstring.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.0
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(bits, count)| (bits.as_str(), *count))
    }

    /// Number of distinct bitstrings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(bitstring, count)` in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(bits, count)| (bits.as_str(), *count))
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (bits, count) in iter {
            counts.insert(bits, count);
        }
        counts
    }
}

/// Result of a batch job: one histogram per submitted circuit, in
/// submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Histograms, aligned with the submitted circuits.
    pub counts: Vec<Counts>,
    /// Shots executed per circuit.
    pub shots: u32,
    /// Execution time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl ExecutionResult {
    /// Create a result for a batch.
    pub fn new(counts: Vec<Counts>, shots: u32) -> Self {
        Self {
            counts,
            shots,
            execution_time_ms: None,
        }
    }

    /// Create a result holding a single histogram.
    pub fn single(counts: Counts, shots: u32) -> Self {
        Self::new(vec![counts], shots)
    }

    /// Set the execution time.
    #[must_use]
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Number of histograms.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check whether no histograms were returned.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
