//! fisherman Demo Suite
//!
//! Builds a quantum kernel, the matrix of pairwise state overlaps of a
//! feature map evaluated on classical data points, on every kind of backend
//! the overlap estimator supports:
//!
//! - **Exact**: no backend, pure linear algebra
//! - **Statevector simulator**: exact, amplitudes reported by the backend
//! - **Shot simulator**: compute-uncompute sampling without noise
//! - **Noisy simulator**: sampling with depolarizing and readout errors

pub mod circuits;
pub mod runners;

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner for a running estimation.
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(spinner);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Print a demo header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {title}")).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

/// Print a demo section.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("ℹ").blue(), message);
}

/// Print a square matrix with fixed precision.
pub fn print_matrix(rows: &[Vec<f64>]) {
    for row in rows {
        let cells: Vec<String> = row.iter().map(|v| format!("{v:.3}")).collect();
        println!("    [{}]", cells.join("  "));
    }
}
