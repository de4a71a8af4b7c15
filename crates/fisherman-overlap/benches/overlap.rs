//! Benchmarks for overlap estimation
//!
//! Run with: cargo bench -p fisherman-overlap

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fisherman_adapter_sim::SimulatorBackend;
use fisherman_ir::{Circuit, ParameterExpression, QubitId};
use fisherman_overlap::{
    OverlapConfig, OverlapEstimator, ParameterBinding, QuantumState, cu_circuit, sym_from_triu,
    triangular_len,
};
use tokio::runtime::Runtime;

fn ansatz(num_qubits: u32) -> QuantumState {
    let mut c = Circuit::new("bench", num_qubits);
    for q in 0..num_qubits {
        c.ry(ParameterExpression::symbol("theta"), QubitId(q)).unwrap();
    }
    for q in 1..num_qubits {
        c.cx(QubitId(q - 1), QubitId(q)).unwrap();
    }
    c.into()
}

fn sweep(points: usize) -> ParameterBinding {
    ParameterBinding::new().with("theta", (0..points).map(|k| k as f64 * 0.1))
}

/// Benchmark building compute-uncompute circuits
fn bench_cu_circuit(c: &mut Criterion) {
    let mut group = c.benchmark_group("cu_circuit");

    for num_qubits in [2, 8, 16] {
        let state = QuantumState::from(Circuit::ghz(num_qubits).unwrap());
        group.bench_with_input(BenchmarkId::new("ghz", num_qubits), &state, |b, s| {
            b.iter(|| cu_circuit(black_box(s), black_box(s)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark exact sweep evaluation
fn bench_exact_sweep(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("exact_sweep");

    for (num_qubits, points) in [(4, 8), (8, 8), (8, 32)] {
        let state = ansatz(num_qubits);
        let binding = sweep(points);
        group.bench_function(BenchmarkId::new(format!("{num_qubits}q"), points), |b| {
            b.iter(|| {
                rt.block_on(
                    OverlapEstimator::new(&state)
                        .sweep(black_box(binding.clone()))
                        .run(),
                )
                .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark sampled sweep evaluation on the shot simulator
fn bench_sampled_sweep(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let backend = SimulatorBackend::shots_only().with_seed(7);
    let config = OverlapConfig::default().with_shots(1024);
    let mut group = c.benchmark_group("sampled_sweep");
    group.sample_size(20);

    for points in [4, 8] {
        let state = ansatz(4);
        let binding = sweep(points);
        group.bench_function(BenchmarkId::new("4q", points), |b| {
            b.iter(|| {
                rt.block_on(
                    OverlapEstimator::new(&state)
                        .sweep(binding.clone())
                        .with_backend(&backend)
                        .with_config(config.clone())
                        .run(),
                )
                .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark triangular unpacking
fn bench_sym_from_triu(c: &mut Criterion) {
    let mut group = c.benchmark_group("sym_from_triu");

    for n in [16, 128, 512] {
        let packed = vec![0.5; triangular_len(n)];
        group.bench_with_input(BenchmarkId::from_parameter(n), &packed, |b, p| {
            b.iter(|| sym_from_triu(black_box(p), n).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_cu_circuit,
    bench_exact_sweep,
    bench_sampled_sweep,
    bench_sym_from_triu
);
criterion_main!(benches);
