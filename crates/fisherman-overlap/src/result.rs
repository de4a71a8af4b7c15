//! Overlap results and triangular packing.
//!
//! Symmetric matrices are packed as their upper triangle including the
//! diagonal, row by row:
//!
//! ```text
//!   (0,0) (0,1) … (0,n-1) (1,1) (1,2) … (1,n-1) … (n-1,n-1)
//! ```
//!
//! The packed length is n(n+1)/2. [`upper_triangle`] yields the pairs in
//! this order and [`sym_from_triu`] unpacks it.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{OverlapError, OverlapResult};

/// Estimated squared overlaps, shaped by the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlap {
    /// One pair.
    Scalar(f64),
    /// `state0` against each candidate, in order.
    Vector(Vec<f64>),
    /// Pairwise overlaps of a parameter sweep, symmetric.
    Matrix(Array2<f64>),
}

impl Overlap {
    /// The value if this is a scalar.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Overlap::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// The values if this is a vector.
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Overlap::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// The matrix if this came from a sweep.
    pub fn as_matrix(&self) -> Option<&Array2<f64>> {
        match self {
            Overlap::Matrix(m) => Some(m),
            _ => None,
        }
    }

    /// Every value, in row-major order.
    pub fn values(&self) -> Vec<f64> {
        match self {
            Overlap::Scalar(v) => vec![*v],
            Overlap::Vector(v) => v.clone(),
            Overlap::Matrix(m) => m.iter().copied().collect(),
        }
    }
}

/// Number of packed entries for an `n`×`n` symmetric matrix.
pub fn triangular_len(n: usize) -> usize {
    n * (n + 1) / 2
}

/// Index pairs `(i, j)` with `i <= j`, in packing order.
pub fn upper_triangle(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |i| (i..n).map(move |j| (i, j)))
}

/// Position of `(i, j)` (`i <= j`) in the packed vector.
pub fn triu_index(i: usize, j: usize, n: usize) -> usize {
    debug_assert!(i <= j && j < n);
    // rows 0..i contribute n + (n-1) + … + (n-i+1) entries
    i * n - i * (i.saturating_sub(1)) / 2 + (j - i)
}

/// Rebuild the symmetric `n`×`n` matrix from its packed upper triangle.
///
/// `M[i][j] = M[j][i] = values[triu_index(i, j, n)]` for `i <= j`.
pub fn sym_from_triu(values: &[f64], n: usize) -> OverlapResult<Array2<f64>> {
    let expected = triangular_len(n);
    if values.len() != expected {
        return Err(OverlapError::TriangularLength {
            n,
            expected,
            got: values.len(),
        });
    }

    let mut matrix = Array2::zeros((n, n));
    for ((i, j), &v) in upper_triangle(n).zip(values) {
        matrix[[i, j]] = v;
        matrix[[j, i]] = v;
    }
    Ok(matrix)
}
