//! Generation run orchestration.
//!
//! A run validates everything up front, issues all vertices sequentially,
//! then enumerates intra-partition edges and finally inter-partition edges.
//! Each edge phase is dispatched to the worker pool and fully joined before
//! the next one starts.

use std::{fmt, num::NonZeroUsize};

use rand::Rng;
use tracing::{info, instrument};

use crate::{
    Result,
    batch::BatchStats,
    cancel::CancellationToken,
    clique_edges::{CliqueEdgeEnumerator, CliqueSelection},
    dispatch::{Phase, WorkerPool, job_rng},
    inter_part::InterPartEdgeConnector,
    partition_table::PartitionTable,
    partitioner::{WorkPartitioner, WorkRange},
    shape::{GraphShape, GraphSpec},
    sink::BulkSink,
    vertices::{IdCursor, VertexBatchProducer},
};

/// Counters describing a finished run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Vertex documents committed.
    pub vertices: u64,
    /// Edge documents committed.
    pub edges: u64,
    /// Closed partitions in the run's table.
    pub partitions: usize,
    /// Vertex batches committed.
    pub vertex_batches: u64,
    /// Edge batches committed.
    pub edge_batches: u64,
}

/// Entry point for generating benchmark graphs.
///
/// # Examples
/// ```
/// use cliquegen_core::{GeneratorBuilder, GraphShape, GraphSpec, MemorySink};
///
/// let generator = GeneratorBuilder::new()
///     .with_workers(2)
///     .with_graph(GraphSpec::default().with_directed(true))
///     .build()?;
/// let sink = MemorySink::default();
/// let summary = generator.run(&GraphShape::Clique { size: 5, prob_missing: 0.0 }, &sink)?;
/// assert_eq!(summary.vertices, 5);
/// assert_eq!(summary.edges, 10);
/// # Ok::<(), cliquegen_core::GeneratorError>(())
/// ```
pub struct Generator {
    bulk_size: NonZeroUsize,
    partitioner: WorkPartitioner,
    pool: WorkerPool,
    seed: u64,
    row_flush: bool,
    graph: GraphSpec,
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("bulk_size", &self.bulk_size)
            .field("workers", &self.pool.workers())
            .field("seed", &self.seed)
            .field("row_flush", &self.row_flush)
            .field("graph", &self.graph)
            .finish()
    }
}

/// Rows of one partition assigned to one intra-phase job.
#[derive(Clone, Copy, Debug)]
struct IntraJob {
    partition: usize,
    rows: WorkRange,
}

impl fmt::Display for IntraJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "partition {} rows {}", self.partition, self.rows)
    }
}

impl Generator {
    pub(crate) fn new(
        bulk_size: NonZeroUsize,
        partitioner: WorkPartitioner,
        pool: WorkerPool,
        seed: u64,
        row_flush: bool,
        graph: GraphSpec,
    ) -> Self {
        Self {
            bulk_size,
            partitioner,
            pool,
            seed,
            row_flush,
            graph,
        }
    }

    /// Returns the number of documents per batch.
    #[must_use]
    pub fn bulk_size(&self) -> NonZeroUsize {
        self.bulk_size
    }

    /// Returns the worker count.
    #[must_use]
    pub fn workers(&self) -> NonZeroUsize {
        self.pool.workers()
    }

    /// Returns the run seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the graph options.
    #[must_use]
    pub fn graph(&self) -> &GraphSpec {
        &self.graph
    }

    /// Generates `shape` into `sink`.
    ///
    /// # Errors
    /// Returns a precondition error before anything is committed when the
    /// shape or the property lists are invalid, and
    /// [`crate::GeneratorError::Sink`] when a commit fails.
    pub fn run(&self, shape: &GraphShape, sink: &dyn BulkSink) -> Result<GenerationSummary> {
        self.run_with_cancellation(shape, sink, &CancellationToken::new())
    }

    /// Generates `shape` into `sink`, stopping at the next flush once
    /// `cancel` is triggered.
    ///
    /// # Errors
    /// As [`Self::run`], plus [`crate::GeneratorError::Cancelled`] when the
    /// run was cancelled without any job failing.
    #[instrument(
        name = "generator.run",
        err,
        skip(self, shape, sink, cancel),
        fields(
            kind = shape.kind(),
            sink = %sink.name(),
            workers = self.pool.workers().get(),
            bulk_size = self.bulk_size.get(),
            seed = self.seed,
        ),
    )]
    pub fn run_with_cancellation(
        &self,
        shape: &GraphShape,
        sink: &dyn BulkSink,
        cancel: &CancellationToken,
    ) -> Result<GenerationSummary> {
        shape.validate()?;
        self.graph.check_lists(shape.max_vertices())?;

        let (table, vertex_stats) = self.vertex_phase(shape, sink, cancel)?;
        let intra = self.intra_phase(shape, &table, sink, cancel)?;
        let inter = self.inter_phase(shape, &table, sink, cancel)?;
        let edges = intra.merge(inter);

        let summary = GenerationSummary {
            vertices: vertex_stats.documents,
            edges: edges.documents,
            partitions: table.num_partitions(),
            vertex_batches: vertex_stats.batches,
            edge_batches: edges.batches,
        };
        info!(
            vertices = summary.vertices,
            edges = summary.edges,
            partitions = summary.partitions,
            "generation complete"
        );
        Ok(summary)
    }

    #[instrument(name = "generator.vertex_phase", err, skip_all)]
    fn vertex_phase(
        &self,
        shape: &GraphShape,
        sink: &dyn BulkSink,
        cancel: &CancellationToken,
    ) -> Result<(PartitionTable, BatchStats)> {
        let mut rng = job_rng(self.seed, Phase::Vertex, 0);
        let sizes: Vec<u64> = match shape {
            GraphShape::Clique { size, .. } => vec![*size],
            GraphShape::CliquesGraph(params) | GraphShape::KPartite(params) => (0..params.count)
                .map(|_| rng.gen_range(params.min_size..=params.max_size))
                .collect(),
        };

        let producer = VertexBatchProducer::new(&self.graph.vertex_property, self.bulk_size)
            .with_partition_labels(shape.tracks_partitions());
        let mut cursor = IdCursor::new();
        let mut table = PartitionTable::new();
        let mut stats = BatchStats::default();
        for size in sizes {
            let (block, block_stats) = producer.produce(&mut cursor, size, &mut rng, sink, cancel)?;
            debug_assert_eq!(table.start_of(table.num_partitions()), Some(block.lo));
            table.extend_open(block.len());
            table.close_open();
            stats = stats.merge(block_stats);
        }
        debug_assert_eq!(cursor.position(), table.total_vertices());

        info!(
            vertices = table.total_vertices(),
            partitions = table.num_partitions(),
            "vertex phase complete"
        );
        Ok((table, stats))
    }

    #[instrument(name = "generator.intra_phase", err, skip_all)]
    fn intra_phase(
        &self,
        shape: &GraphShape,
        table: &PartitionTable,
        sink: &dyn BulkSink,
        cancel: &CancellationToken,
    ) -> Result<BatchStats> {
        let (prob_missing, pairs) = match shape.intra_prob_missing() {
            Some(p) => (p, true),
            None if self.graph.self_loops => (0.0, false),
            None => return Ok(BatchStats::default()),
        };
        let enumerator =
            CliqueEdgeEnumerator::new(&self.graph, table.total_vertices(), prob_missing, self.bulk_size)?
                .with_row_flush(self.row_flush)
                .with_pairs(pairs)
                .with_partition_labels(shape.tracks_partitions());

        let jobs: Vec<IntraJob> = table
            .ranges()
            .enumerate()
            .flat_map(|(partition, clique)| {
                self.partitioner
                    .split(clique)
                    .into_iter()
                    .filter(|rows| !rows.is_empty())
                    .map(move |rows| IntraJob { partition, rows })
            })
            .collect();

        let stats = self
            .pool
            .run(Phase::Intra, self.seed, &jobs, cancel, |job, rng| {
                let clique = CliqueSelection::partition(job.partition).resolve(table)?;
                enumerator.enumerate_rows(clique, job.rows, rng, sink, cancel)
            })?;
        info!(jobs = jobs.len(), edges = stats.documents, "intra phase complete");
        Ok(stats)
    }

    #[instrument(name = "generator.inter_phase", err, skip_all)]
    fn inter_phase(
        &self,
        shape: &GraphShape,
        table: &PartitionTable,
        sink: &dyn BulkSink,
        cancel: &CancellationToken,
    ) -> Result<BatchStats> {
        let Some((prob_missing_all, prob_missing_one)) = shape.inter_prob_missing() else {
            return Ok(BatchStats::default());
        };
        let connector = InterPartEdgeConnector::new(
            &self.graph,
            table.total_vertices(),
            prob_missing_all,
            prob_missing_one,
            self.bulk_size,
        )?
        .with_row_flush(self.row_flush);

        let rows = WorkRange::new(0, table.num_partitions() as u64);
        let jobs: Vec<WorkRange> = self
            .partitioner
            .split(rows)
            .into_iter()
            .filter(|rows| !rows.is_empty())
            .collect();

        let stats = self
            .pool
            .run(Phase::Inter, self.seed, &jobs, cancel, |rows, rng| {
                connector.connect_rows(table, *rows, rng, sink, cancel)
            })?;
        info!(jobs = jobs.len(), edges = stats.documents, "inter phase complete");
        Ok(stats)
    }
}
