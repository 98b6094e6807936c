//! Pair enumeration inside one contiguous vertex range.
//!
//! For every row `i` of the assigned rows and every partner `j` with
//! `i < j < clique.hi`, one Bernoulli draw decides whether the pair is
//! omitted. Accepted pairs are oriented `i -> j` and mirrored when the run
//! stores undirected pairs as two edges.

use std::num::NonZeroUsize;

use rand::Rng;

use crate::{
    Result,
    batch::{BatchStats, BatchWriter, FlushPolicy},
    cancel::CancellationToken,
    document::{EdgeDocument, VertexRef},
    emit::EdgeEmitter,
    error::GeneratorError,
    partition_table::PartitionTable,
    partitioner::WorkRange,
    property::PropertyTarget,
    shape::{GraphSpec, check_probability},
    sink::BulkSink,
};

/// Names the vertex range an enumeration covers.
///
/// Exactly one of an explicit range or a partition index must be supplied.
///
/// # Examples
/// ```
/// use cliquegen_core::{CliqueSelection, GeneratorError, PartitionTable, WorkRange};
///
/// let mut table = PartitionTable::new();
/// table.append(3);
/// table.append(2);
///
/// let range = CliqueSelection::partition(1).resolve(&table)?;
/// assert_eq!(range, WorkRange::new(3, 5));
///
/// let err = CliqueSelection::partition(1)
///     .with_range(WorkRange::new(0, 3))
///     .resolve(&table)
///     .unwrap_err();
/// assert!(matches!(err, GeneratorError::ConfigurationConflict { .. }));
/// # Ok::<(), GeneratorError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CliqueSelection {
    range: Option<WorkRange>,
    partition: Option<usize>,
}

impl CliqueSelection {
    /// Selects an explicit vertex range.
    #[must_use]
    pub const fn range(range: WorkRange) -> Self {
        Self {
            range: Some(range),
            partition: None,
        }
    }

    /// Selects a closed partition of the table.
    #[must_use]
    pub const fn partition(index: usize) -> Self {
        Self {
            range: None,
            partition: Some(index),
        }
    }

    /// Adds an explicit range to the selection.
    #[must_use]
    pub const fn with_range(mut self, range: WorkRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Adds a partition index to the selection.
    #[must_use]
    pub const fn with_partition(mut self, index: usize) -> Self {
        self.partition = Some(index);
        self
    }

    /// Resolves the selection to a vertex range.
    ///
    /// # Errors
    /// Returns [`GeneratorError::ConfigurationConflict`] when both inputs are
    /// present, [`GeneratorError::MissingTarget`] when neither is, and
    /// [`GeneratorError::UnknownPartition`] for an index outside the table.
    pub fn resolve(&self, table: &PartitionTable) -> Result<WorkRange> {
        match (self.range, self.partition) {
            (Some(_), Some(_)) => Err(GeneratorError::ConfigurationConflict {
                first: "range",
                second: "partition",
            }),
            (None, None) => Err(GeneratorError::MissingTarget {
                first: "range",
                second: "partition",
            }),
            (Some(range), None) => Ok(range),
            (None, Some(index)) => {
                table
                    .range_of(index)
                    .ok_or(GeneratorError::UnknownPartition {
                        index,
                        partitions: table.num_partitions(),
                    })
            }
        }
    }
}

/// Enumerates candidate pairs of one clique and streams accepted edges.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use cliquegen_core::{
///     CancellationToken, CliqueEdgeEnumerator, GraphSpec, MemorySink, WorkRange,
/// };
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let graph = GraphSpec::default().with_directed(true);
/// let bulk = NonZeroUsize::new(16).expect("non-zero");
/// let enumerator = CliqueEdgeEnumerator::new(&graph, 4, 0.0, bulk)?;
/// let sink = MemorySink::default();
/// enumerator.enumerate(
///     WorkRange::new(0, 4),
///     &mut SmallRng::seed_from_u64(7),
///     &sink,
///     &CancellationToken::new(),
/// )?;
/// assert_eq!(sink.edges().len(), 6);
/// # Ok::<(), cliquegen_core::GeneratorError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct CliqueEdgeEnumerator<'a> {
    graph: &'a GraphSpec,
    total_vertices: u64,
    prob_missing: f64,
    bulk_size: NonZeroUsize,
    policy: FlushPolicy,
    pairs: bool,
    partition_labels: bool,
}

impl<'a> CliqueEdgeEnumerator<'a> {
    /// Creates an enumerator for a run of `total_vertices` vertices.
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidProbability`] for a bad omission
    /// probability and [`GeneratorError::PropertyListTooShort`] when an edge
    /// list cannot address `total_vertices^2` edges.
    pub fn new(
        graph: &'a GraphSpec,
        total_vertices: u64,
        prob_missing: f64,
        bulk_size: NonZeroUsize,
    ) -> Result<Self> {
        check_probability("prob_missing", prob_missing)?;
        let n = u128::from(total_vertices);
        graph.edge_property.require_len(PropertyTarget::Edge, n * n)?;
        Ok(Self {
            graph,
            total_vertices,
            prob_missing,
            bulk_size,
            policy: FlushPolicy::WhenFull,
            pairs: true,
            partition_labels: false,
        })
    }

    /// Flushes after every row instead of packing batches.
    #[must_use]
    pub const fn with_row_flush(mut self, enabled: bool) -> Self {
        self.policy = if enabled {
            FlushPolicy::EveryRow
        } else {
            FlushPolicy::WhenFull
        };
        self
    }

    /// Enables or disables pair enumeration; self loops are unaffected.
    #[must_use]
    pub const fn with_pairs(mut self, enabled: bool) -> Self {
        self.pairs = enabled;
        self
    }

    /// Labels endpoints with the clique's starting id.
    #[must_use]
    pub const fn with_partition_labels(mut self, enabled: bool) -> Self {
        self.partition_labels = enabled;
        self
    }

    /// Enumerates every row of `clique`.
    ///
    /// # Errors
    /// Returns [`GeneratorError::Sink`] or [`GeneratorError::Cancelled`] from
    /// a flush.
    pub fn enumerate<S, R>(
        &self,
        clique: WorkRange,
        rng: &mut R,
        sink: &S,
        cancel: &CancellationToken,
    ) -> Result<BatchStats>
    where
        S: BulkSink + ?Sized,
        R: Rng,
    {
        self.enumerate_rows(clique, clique, rng, sink, cancel)
    }

    /// Enumerates the rows of `rows` that fall inside `clique`; partners of
    /// each row always run to the end of the clique.
    ///
    /// # Errors
    /// Same as [`Self::enumerate`].
    pub fn enumerate_rows<S, R>(
        &self,
        clique: WorkRange,
        rows: WorkRange,
        rng: &mut R,
        sink: &S,
        cancel: &CancellationToken,
    ) -> Result<BatchStats>
    where
        S: BulkSink + ?Sized,
        R: Rng,
    {
        let part = self.partition_labels.then_some(clique.lo);
        let rows = WorkRange::new(rows.lo.max(clique.lo), rows.hi.min(clique.hi));
        let writer = BatchWriter::<EdgeDocument, S>::new(sink, cancel, self.bulk_size, self.policy);
        let mut emitter = EdgeEmitter::new(self.graph, self.total_vertices, writer);

        for i in rows.indices() {
            let from = VertexRef::in_part(i, part);
            if self.graph.self_loops {
                emitter.self_loop(from, rng)?;
            }
            if self.pairs {
                for j in (i + 1)..clique.hi {
                    if rng.gen_bool(self.prob_missing) {
                        continue;
                    }
                    emitter.pair(from, VertexRef::in_part(j, part), rng)?;
                }
            }
            emitter.end_row()?;
        }
        emitter.finish()
    }
}
