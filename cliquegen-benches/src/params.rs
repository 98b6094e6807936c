//! Benchmark parameter types.
//!
//! Each type renders as the Criterion parameter label of one benchmark case.

use std::{fmt, num::NonZeroUsize};

use crate::error::BenchSetupError;

/// Parameters for partitioner and single-clique benchmarks.
#[derive(Clone, Copy, Debug)]
pub struct CliqueBenchParams {
    /// Vertices in the clique.
    pub vertices: u64,
    /// Worker count the work is split for.
    pub workers: usize,
}

impl CliqueBenchParams {
    /// Returns the worker count as a [`NonZeroUsize`].
    ///
    /// # Errors
    /// Returns [`BenchSetupError::ZeroValue`] when `workers` is zero.
    pub fn workers(&self) -> Result<NonZeroUsize, BenchSetupError> {
        NonZeroUsize::new(self.workers).ok_or(BenchSetupError::ZeroValue { context: "workers" })
    }
}

impl fmt::Display for CliqueBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},w={}", self.vertices, self.workers)
    }
}

/// Parameters for a full cliques-graph run.
#[derive(Clone, Copy, Debug)]
pub struct GraphBenchParams {
    /// Number of cliques.
    pub cliques: u64,
    /// Smallest clique size.
    pub min_size: u64,
    /// Largest clique size.
    pub max_size: u64,
    /// Worker threads.
    pub workers: usize,
}

impl fmt::Display for GraphBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "k={},size={}..={},w={}",
            self.cliques, self.min_size, self.max_size, self.workers
        )
    }
}
