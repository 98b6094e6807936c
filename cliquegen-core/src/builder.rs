//! Builder utilities for configuring generation runs.
//!
//! Collects the bulk size, worker count, seed and graph options, and
//! validates them before a [`Generator`] and its worker pool are created.

use std::{num::NonZeroUsize, thread};

use crate::{
    Result,
    dispatch::WorkerPool,
    error::GeneratorError,
    generator::Generator,
    partitioner::WorkPartitioner,
    shape::GraphSpec,
};

/// Documents per batch unless overridden.
pub const DEFAULT_BULK_SIZE: usize = 10_000;

/// Configures and constructs [`Generator`] instances.
///
/// # Examples
/// ```
/// use cliquegen_core::{GeneratorBuilder, GraphSpec};
///
/// let generator = GeneratorBuilder::new()
///     .with_bulk_size(500)
///     .with_workers(2)
///     .with_seed(9)
///     .with_graph(GraphSpec::default().with_directed(true))
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(generator.bulk_size().get(), 500);
/// assert_eq!(generator.workers().get(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct GeneratorBuilder {
    bulk_size: usize,
    workers: usize,
    seed: u64,
    row_flush: bool,
    graph: GraphSpec,
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self {
            bulk_size: DEFAULT_BULK_SIZE,
            workers: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            seed: 0,
            row_flush: false,
            graph: GraphSpec::default(),
        }
    }
}

impl GeneratorBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use cliquegen_core::GeneratorBuilder;
    ///
    /// let builder = GeneratorBuilder::new();
    /// assert_eq!(builder.bulk_size(), 10_000);
    /// assert_eq!(builder.seed(), 0);
    /// assert!(!builder.row_flush());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the number of documents per batch.
    #[must_use]
    pub fn with_bulk_size(mut self, bulk_size: usize) -> Self {
        self.bulk_size = bulk_size;
        self
    }

    /// Returns the configured bulk size.
    #[must_use]
    pub fn bulk_size(&self) -> usize {
        self.bulk_size
    }

    /// Overrides the worker count.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Returns the configured worker count.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Sets the seed every random draw of a run derives from.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the configured seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Flushes edge batches at every row boundary.
    ///
    /// # Examples
    /// ```
    /// use cliquegen_core::GeneratorBuilder;
    ///
    /// assert!(GeneratorBuilder::new().with_row_flush(true).row_flush());
    /// ```
    #[must_use]
    pub fn with_row_flush(mut self, row_flush: bool) -> Self {
        self.row_flush = row_flush;
        self
    }

    /// Returns whether row-boundary flushing is enabled.
    #[must_use]
    pub fn row_flush(&self) -> bool {
        self.row_flush
    }

    /// Sets the graph options.
    #[must_use]
    pub fn with_graph(mut self, graph: GraphSpec) -> Self {
        self.graph = graph;
        self
    }

    /// Returns the configured graph options.
    #[must_use]
    pub fn graph(&self) -> &GraphSpec {
        &self.graph
    }

    /// Validates the configuration and constructs a [`Generator`].
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidBulkSize`],
    /// [`GeneratorError::InvalidWorkerCount`],
    /// [`GeneratorError::InvalidRandomBounds`] or
    /// [`GeneratorError::WorkerPool`].
    ///
    /// # Examples
    /// ```
    /// use cliquegen_core::{GeneratorBuilder, GeneratorError};
    ///
    /// let err = GeneratorBuilder::new().with_bulk_size(0).build().unwrap_err();
    /// assert!(matches!(err, GeneratorError::InvalidBulkSize { got: 0 }));
    /// ```
    pub fn build(self) -> Result<Generator> {
        let bulk_size = NonZeroUsize::new(self.bulk_size).ok_or(GeneratorError::InvalidBulkSize {
            got: self.bulk_size,
        })?;
        let workers = NonZeroUsize::new(self.workers).ok_or(GeneratorError::InvalidWorkerCount {
            got: self.workers,
        })?;
        self.graph.validate()?;
        let pool = WorkerPool::new(workers)?;
        Ok(Generator::new(
            bulk_size,
            WorkPartitioner::new(workers),
            pool,
            self.seed,
            self.row_flush,
            self.graph,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::property::PropertySpec;

    #[rstest]
    #[case(GeneratorBuilder::new().with_bulk_size(0), "GENERATOR_INVALID_BULK_SIZE")]
    #[case(GeneratorBuilder::new().with_workers(0), "GENERATOR_INVALID_WORKER_COUNT")]
    #[case(
        GeneratorBuilder::new().with_graph(
            GraphSpec::default().with_vertex_property(PropertySpec::Random { min: 3.0, max: 1.0 })
        ),
        "GENERATOR_INVALID_RANDOM_BOUNDS"
    )]
    fn build_rejects_invalid_configuration(#[case] builder: GeneratorBuilder, #[case] code: &str) {
        let err = builder.build().expect_err("configuration must be rejected");
        assert_eq!(err.code().as_str(), code);
        assert!(err.is_precondition());
    }

    #[test]
    fn defaults_use_available_parallelism() {
        let builder = GeneratorBuilder::new();
        assert!(builder.workers() >= 1);
        assert_eq!(builder.bulk_size(), DEFAULT_BULK_SIZE);
        assert_eq!(builder.graph(), &GraphSpec::default());
    }
}
