//! State-preparation circuits for kernel demos.

pub mod feature_map;

pub use feature_map::{feature_symbol, random_points, zz_feature_map};
