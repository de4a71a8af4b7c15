//! Demo runners.

pub mod kernel;

pub use kernel::{KernelResult, KernelRunner, max_deviation};
