//! Benchmark support crate for cliquegen.
//!
//! Provides parameter types and the setup error shared by the Criterion
//! benchmarks of the work partitioner, clique enumeration and full runs.

pub mod error;
pub mod params;
