//! Quantum Kernel Demo
//!
//! Estimates the kernel matrix of a ZZ feature map on random data points
//! with every backend kind and compares the sampled kernels to the exact one.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fisherman_adapter_sim::SimulatorBackend;
use fisherman_hal::Backend;
use fisherman_overlap::{Candidates, OverlapConfig, OverlapEstimator, compute_uncompute_overlap};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fisherman_demos::circuits::{random_points, zz_feature_map};
use fisherman_demos::runners::{KernelResult, KernelRunner, max_deviation};
use fisherman_demos::{
    create_spinner, print_header, print_info, print_matrix, print_result, print_section,
    print_success,
};

const EXACT: &str = "exact";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendKind {
    /// No backend
    Exact,
    /// Statevector simulator
    Statevector,
    /// Noiseless shot sampling
    Shots,
    /// Depolarizing and readout noise
    Noisy,
    /// All of the above
    All,
}

#[derive(Parser, Debug)]
#[command(name = "demo-kernel")]
#[command(about = "Estimate a quantum kernel with compute-uncompute overlaps")]
struct Args {
    /// Number of qubits (features per data point)
    #[arg(short, long, default_value = "3")]
    qubits: u32,

    /// Number of data points
    #[arg(short, long, default_value = "4")]
    points: usize,

    /// Feature map repetitions
    #[arg(long, default_value = "2")]
    reps: usize,

    /// Backend to run on
    #[arg(short, long, value_enum, default_value = "all")]
    backend: BackendKind,

    /// Shots per circuit (overrides the config file)
    #[arg(short, long)]
    shots: Option<u32>,

    /// YAML configuration file
    #[arg(short, long, env = "FISHERMAN_CONFIG")]
    config: Option<PathBuf>,

    /// Depolarizing probability for the noisy simulator
    #[arg(long, default_value = "0.01")]
    depolarizing: f64,

    /// Readout error for the noisy simulator
    #[arg(long, default_value = "0.02")]
    readout_error: f64,

    /// Seed for data points and sampling
    #[arg(long, default_value = "7")]
    seed: u64,

    /// Write all kernels as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    print_header("fisherman Quantum Kernel Demo");

    let mut config = OverlapConfig::load(args.config.as_deref())?;
    if let Some(shots) = args.shots {
        config = config.with_shots(shots);
    }
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let feature_map = zz_feature_map(args.qubits, args.reps)?;
    let points = random_points(&mut rng, args.qubits, args.points);

    print_section("Problem Setup");
    print_result("Feature map", feature_map.name());
    print_result("Qubits", args.qubits);
    print_result("Gates", feature_map.num_ops());
    print_result("Data points", args.points);
    print_result("Shots", config.shots);

    let runner = KernelRunner::new(feature_map, points.clone()).with_config(config.clone());

    let backends = build_backends(&args);
    let mut kernels = Vec::new();
    for (label, backend) in &backends {
        print_section(&format!("Kernel: {label}"));
        let spinner = create_spinner(&format!("estimating on {label}"));
        let kernel = runner.run(label, backend.as_deref()).await;
        spinner.finish_and_clear();

        let kernel = kernel?;
        print_matrix(&kernel.matrix);
        print_result("Diagonal error", format!("{:.4}", kernel.diagonal_error()));
        print_result("Time", format!("{} ms", kernel.elapsed_ms));
        kernels.push(kernel);
    }

    if let Some(reference) = kernels.iter().find(|k| k.backend == EXACT) {
        print_section("Deviation From Exact");
        for kernel in kernels.iter().filter(|k| k.backend != EXACT) {
            print_result(&kernel.backend, format!("{:.4}", max_deviation(kernel, reference)));
        }
    }

    print_section("Other Calling Shapes");
    let bound = points.bind(runner.feature_map())?;
    if let Some(first) = bound.first() {
        let self_overlap = OverlapEstimator::new(first).run().await?;
        print_result("Self overlap of point 0", format!("{:.6}", self_overlap.values()[0]));

        let row = OverlapEstimator::new(first)
            .against_all(bound.iter().cloned())
            .run()
            .await?;
        let row: Vec<String> = row.values().iter().map(|v| format!("{v:.3}")).collect();
        print_result("Point 0 against all", row.join("  "));

        if let Some(second) = bound.get(1) {
            let pair = compute_uncompute_overlap(
                first,
                Some(Candidates::One(second.clone())),
                None,
                None,
                None,
            )
            .await?;
            print_result("Point 0 against point 1", format!("{:.6}", pair.values()[0]));
        }
    }

    if let Some(path) = &args.output {
        write_kernels(path, &kernels)?;
        print_info(&format!("Kernels written to {}", path.display()));
    }

    println!();
    print_success("Kernel demo complete!");
    Ok(())
}

fn build_backends(args: &Args) -> Vec<(String, Option<Box<dyn Backend>>)> {
    let statevector = || -> Box<dyn Backend> { Box::new(SimulatorBackend::new()) };
    let shots = || -> Box<dyn Backend> { Box::new(SimulatorBackend::shots_only().with_seed(args.seed)) };
    let noisy = || -> Box<dyn Backend> {
        Box::new(SimulatorBackend::noisy(args.depolarizing, args.readout_error).with_seed(args.seed))
    };

    let mut backends = Vec::new();
    let all = args.backend == BackendKind::All;
    if all || args.backend == BackendKind::Exact {
        backends.push((EXACT.to_string(), None));
    }
    if all || args.backend == BackendKind::Statevector {
        backends.push(("statevector simulator".to_string(), Some(statevector())));
    }
    if all || args.backend == BackendKind::Shots {
        backends.push(("shot simulator".to_string(), Some(shots())));
    }
    if all || args.backend == BackendKind::Noisy {
        backends.push(("noisy simulator".to_string(), Some(noisy())));
    }
    backends
}

fn write_kernels(path: &std::path::Path, kernels: &[KernelResult]) -> Result<()> {
    let json = serde_json::to_string_pretty(kernels)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), kernels = kernels.len(), "kernels saved");
    Ok(())
}
