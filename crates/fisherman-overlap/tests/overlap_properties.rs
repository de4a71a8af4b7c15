//! Property tests for overlap matrices and triangular packing.

use fisherman_ir::{Circuit, ParameterExpression, QubitId};
use fisherman_overlap::{
    Overlap, ParameterBinding, QuantumState, compute_uncompute_overlap, sym_from_triu,
    triangular_len, triu_index, upper_triangle,
};
use proptest::prelude::*;

fn ansatz(num_qubits: u32) -> QuantumState {
    let mut c = Circuit::new("layer", num_qubits);
    for q in 0..num_qubits {
        c.ry(ParameterExpression::symbol("a"), QubitId(q)).unwrap();
    }
    for q in 1..num_qubits {
        c.cx(QubitId(q - 1), QubitId(q)).unwrap();
    }
    for q in 0..num_qubits {
        c.rz(ParameterExpression::symbol("b"), QubitId(q)).unwrap();
    }
    c.into()
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn sweep_matrix_is_symmetric_with_unit_diagonal(
        num_qubits in 1u32..4,
        points in prop::collection::vec((-3.2f64..3.2, -3.2f64..3.2), 1..6),
    ) {
        let (a, b): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();
        let n = a.len();
        let sweep = ParameterBinding::new().with("a", a).with("b", b);

        let overlap = block_on(compute_uncompute_overlap(
            &ansatz(num_qubits),
            None,
            Some(sweep),
            None,
            None,
        ))
        .unwrap();

        let Overlap::Matrix(m) = overlap else {
            panic!("sweep must give a matrix");
        };
        prop_assert_eq!(m.shape(), &[n, n]);
        for i in 0..n {
            prop_assert!((m[[i, i]] - 1.0).abs() < 1e-10);
            for j in 0..n {
                prop_assert_eq!(m[[i, j]], m[[j, i]]);
                prop_assert!((0.0..=1.0).contains(&m[[i, j]]));
            }
        }
    }

    #[test]
    fn triu_unpacking_places_every_value(n in 0usize..12) {
        let packed: Vec<f64> = (0..triangular_len(n)).map(|k| k as f64).collect();
        let m = sym_from_triu(&packed, n).unwrap();
        for (i, j) in upper_triangle(n) {
            let expected = triu_index(i, j, n) as f64;
            prop_assert_eq!(m[[i, j]], expected);
            prop_assert_eq!(m[[j, i]], expected);
        }
    }
}
