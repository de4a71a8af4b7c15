//! Property tests for the statevector engine.

use fisherman_adapter_sim::Statevector;
use fisherman_ir::{Circuit, QubitId};
use proptest::prelude::*;

fn arb_preparation() -> impl Strategy<Value = Circuit> {
    let angle = -3.2f64..3.2;
    let op = (0_u8..6, 0_u32..3, 0_u32..3, angle);
    prop::collection::vec(op, 1..=10).prop_map(|ops| {
        let mut circuit = Circuit::new("prep", 3);
        for (kind, a, b, theta) in ops {
            let _ = match kind {
                0 => circuit.h(QubitId(a)),
                1 => circuit.ry(theta, QubitId(a)),
                2 => circuit.rz(theta, QubitId(a)),
                3 => circuit.cx(QubitId(a), QubitId(b)),
                4 => circuit.rxx(theta, QubitId(a), QubitId(b)),
                _ => circuit.cp(theta, QubitId(a), QubitId(b)),
            };
        }
        circuit
    })
}

proptest! {
    #[test]
    fn test_evolution_preserves_norm(prep in arb_preparation()) {
        let sv = Statevector::from_circuit(&prep).unwrap();
        prop_assert!((sv.norm_sqr() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_compute_uncompute_amplitude_matches_inner_product(
        a in arb_preparation(),
        b in arb_preparation(),
    ) {
        let psi = Statevector::from_circuit(&a).unwrap();
        let phi = Statevector::from_circuit(&b).unwrap();

        let mut cu = a.clone();
        cu.barrier_all().unwrap();
        cu.compose(&b.inverse().unwrap()).unwrap();
        let zero_amp = Statevector::from_circuit(&cu).unwrap().amplitudes()[0];

        // ⟨0|V†U|0⟩ = ⟨φ|ψ⟩
        let expected = phi.inner_product(&psi);
        prop_assert!((zero_amp - expected).norm() < 1e-9);
    }
}
