//! Backend capability introspection.
//!
//! [`Capabilities`] describe what a backend can do: qubit count, shot
//! limits, whether it is a simulator, which simulation features it offers
//! and how noisy it is. Overlap estimation classifies a backend from this
//! descriptor alone, see [`Capabilities::is_exact`].
//!
//! Standardised feature flags:
//! - `"statevector"`: the backend can report the exact amplitudes of a
//!   circuit through `Backend::statevector`
//! - `"shots"`: the backend samples measurement outcomes

use serde::{Deserialize, Serialize};

/// Feature flag for exact amplitude access.
pub const FEATURE_STATEVECTOR: &str = "statevector";

/// Feature flag for shot-based sampling.
pub const FEATURE_SHOTS: &str = "shots";

/// Hardware capabilities of a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Maximum number of shots per circuit.
    pub max_shots: u32,
    /// Whether this is a simulator or emulator (`true`) vs real hardware (`false`).
    pub is_simulator: bool,
    /// Additional capability flags, see the module docs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    /// Device-wide noise averages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_profile: Option<NoiseProfile>,
}

impl Capabilities {
    /// Create capabilities for an ideal statevector simulator.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            max_shots: 100_000,
            is_simulator: true,
            features: vec![FEATURE_STATEVECTOR.into(), FEATURE_SHOTS.into()],
            noise_profile: None,
        }
    }

    /// Create capabilities for a simulator that only reports sampled counts.
    pub fn shot_simulator(num_qubits: u32) -> Self {
        Self {
            name: "shot_simulator".into(),
            num_qubits,
            max_shots: 100_000,
            is_simulator: true,
            features: vec![FEATURE_SHOTS.into()],
            noise_profile: None,
        }
    }

    /// Create capabilities for a hardware device.
    pub fn hardware(name: impl Into<String>, num_qubits: u32, max_shots: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            max_shots,
            is_simulator: false,
            features: vec![FEATURE_SHOTS.into()],
            noise_profile: None,
        }
    }

    /// Set the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach a noise profile.
    #[must_use]
    pub fn with_noise_profile(mut self, profile: NoiseProfile) -> Self {
        self.noise_profile = Some(profile);
        self
    }

    /// Check if a feature flag is present.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    /// Whether results from this backend are noiseless and deterministic.
    ///
    /// True for a simulator that exposes amplitudes and carries no noise
    /// profile. Everything else must be treated as a sampling backend.
    pub fn is_exact(&self) -> bool {
        self.is_simulator
            && self.has_feature(FEATURE_STATEVECTOR)
            && self.noise_profile.as_ref().is_none_or(NoiseProfile::is_ideal)
    }
}

/// Device-wide noise averages.
///
/// Fidelities are in `[0, 1]`; a missing value means "ideal".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseProfile {
    /// Average single-qubit gate fidelity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_qubit_fidelity: Option<f64>,
    /// Average two-qubit gate fidelity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_qubit_fidelity: Option<f64>,
    /// Average readout fidelity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readout_fidelity: Option<f64>,
}

impl NoiseProfile {
    /// Uniform depolarizing gate error `p` and readout error `readout`.
    pub fn uniform(p: f64, readout: f64) -> Self {
        Self {
            single_qubit_fidelity: Some(1.0 - p),
            two_qubit_fidelity: Some(1.0 - p),
            readout_fidelity: Some(1.0 - readout),
        }
    }

    /// Error probability after a single-qubit gate.
    pub fn single_qubit_error(&self) -> f64 {
        error_from(self.single_qubit_fidelity)
    }

    /// Error probability after a multi-qubit gate.
    pub fn two_qubit_error(&self) -> f64 {
        error_from(self.two_qubit_fidelity)
    }

    /// Probability of flipping a measured bit.
    pub fn readout_error(&self) -> f64 {
        error_from(self.readout_fidelity)
    }

    /// Check whether every error probability is zero.
    pub fn is_ideal(&self) -> bool {
        self.single_qubit_error() == 0.0
            && self.two_qubit_error() == 0.0
            && self.readout_error() == 0.0
    }
}

fn error_from(fidelity: Option<f64>) -> f64 {
    fidelity.map_or(0.0, |f| (1.0 - f).clamp(0.0, 1.0))
}
