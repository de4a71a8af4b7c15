//! ZZ feature map.
//!
//! Encodes a classical point `x ∈ ℝⁿ` into an n-qubit state. Each repetition
//! applies `H` then `P(2·xᵢ)` on every qubit, followed by `RZZ(2·xᵢ·xᵢ₊₁)` on
//! neighbouring pairs. The map is built once with symbolic angles `x0…x{n-1}`
//! and bound per point through a [`ParameterBinding`].

use fisherman_ir::{Circuit, IrResult, ParameterExpression, QubitId};
use fisherman_overlap::ParameterBinding;
use rand::Rng;

/// Symbol carrying feature `index`.
pub fn feature_symbol(index: u32) -> String {
    format!("x{index}")
}

/// Build a parameterized ZZ feature map on `n_qubits` qubits.
pub fn zz_feature_map(n_qubits: u32, reps: usize) -> IrResult<Circuit> {
    let mut circuit = Circuit::new(format!("zz_map_{n_qubits}q"), n_qubits);
    let x = |q: u32| ParameterExpression::symbol(feature_symbol(q));
    let two = || ParameterExpression::constant(2.0);

    for _ in 0..reps {
        for q in 0..n_qubits {
            circuit.h(QubitId(q))?;
            circuit.p(two() * x(q), QubitId(q))?;
        }
        for q in 1..n_qubits {
            circuit.rzz(two() * x(q - 1) * x(q), QubitId(q - 1), QubitId(q))?;
        }
    }
    Ok(circuit)
}

/// `points` uniform random data points in `[-π, π)ⁿ`, one sweep entry each.
pub fn random_points<R: Rng>(rng: &mut R, n_qubits: u32, points: usize) -> ParameterBinding {
    (0..n_qubits)
        .map(|q| {
            let values: Vec<f64> = (0..points)
                .map(|_| rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI))
                .collect();
            (feature_symbol(q), values)
        })
        .collect()
}
