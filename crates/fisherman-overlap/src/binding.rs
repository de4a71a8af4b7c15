//! Parameter sweeps.

use std::collections::{BTreeMap, HashMap};

use fisherman_ir::{IrError, IrResult};
use serde::{Deserialize, Serialize};

use crate::error::OverlapResult;
use crate::state::QuantumState;

/// Symbol name → values, one value per sweep point.
///
/// Every symbol carries the same number of values `n`; binding produces
/// `n` states in sweep order.
///
/// ```
/// use fisherman_overlap::ParameterBinding;
///
/// let sweep = ParameterBinding::new()
///     .with("theta", [0.0, 0.5, 1.0])
///     .with("phi", [1.0, 1.0, 1.0]);
/// assert_eq!(sweep.len().unwrap(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterBinding(BTreeMap<String, Vec<f64>>);

impl ParameterBinding {
    /// Create an empty binding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the values of one symbol.
    #[must_use]
    pub fn with(mut self, symbol: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        self.insert(symbol, values);
        self
    }

    /// Add (or replace) the values of one symbol.
    pub fn insert(&mut self, symbol: impl Into<String>, values: impl IntoIterator<Item = f64>) {
        self.0.insert(symbol.into(), values.into_iter().collect());
    }

    /// Symbols in this binding, sorted.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Check whether no symbol is bound.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of sweep points.
    ///
    /// Fails with [`IrError::BindingLengthMismatch`] if value lists differ
    /// in length.
    pub fn len(&self) -> IrResult<usize> {
        let mut lists = self.0.iter();
        let Some((_, first)) = lists.next() else {
            return Ok(0);
        };
        let expected = first.len();
        for (symbol, values) in lists {
            if values.len() != expected {
                return Err(IrError::BindingLengthMismatch {
                    parameter: symbol.clone(),
                    expected,
                    got: values.len(),
                });
            }
        }
        Ok(expected)
    }

    /// One concrete assignment per sweep point.
    pub fn assignments(&self) -> IrResult<Vec<HashMap<String, f64>>> {
        let n = self.len()?;
        Ok((0..n)
            .map(|k| {
                self.0
                    .iter()
                    .map(|(symbol, values)| (symbol.clone(), values[k]))
                    .collect()
            })
            .collect())
    }

    /// Bind every sweep point to `state`.
    ///
    /// Amplitude states carry no symbols and are repeated unchanged.
    pub fn bind(&self, state: &QuantumState) -> OverlapResult<Vec<QuantumState>> {
        let assignments = self.assignments()?;
        Ok(match state {
            QuantumState::Prepared(circuit) => assignments
                .iter()
                .enumerate()
                .map(|(k, values)| {
                    let bound = circuit
                        .bind_parameters(values)
                        .with_name(format!("{}[{k}]", circuit.name()));
                    QuantumState::Prepared(bound)
                })
                .collect(),
            QuantumState::Amplitudes(_) => vec![state.clone(); assignments.len()],
        })
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<f64>)> for ParameterBinding {
    fn from_iter<I: IntoIterator<Item = (S, Vec<f64>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(s, v)| (s.into(), v)).collect())
    }
}
