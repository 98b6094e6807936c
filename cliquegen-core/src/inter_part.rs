//! Probabilistic connection of partition pairs.
//!
//! Rows are partition indices: row `v` owns the pairs `(v, w)` with
//! `v < w < partitions`, so a set of rows can be split across workers with the
//! same triangular partitioner used for cliques. The split balances the
//! number of pairs, not their `|v| * |w|` cost.

use std::num::NonZeroUsize;

use rand::Rng;

use crate::{
    Result,
    batch::{BatchStats, BatchWriter, FlushPolicy},
    cancel::CancellationToken,
    document::{EdgeDocument, VertexRef},
    emit::EdgeEmitter,
    partition_table::PartitionTable,
    partitioner::WorkRange,
    property::PropertyTarget,
    shape::{GraphSpec, check_probability},
    sink::BulkSink,
};

/// Connects every pair of closed partitions of a [`PartitionTable`].
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use cliquegen_core::{
///     CancellationToken, GraphSpec, InterPartEdgeConnector, MemorySink, PartitionTable,
///     UndirectedStorage,
/// };
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut table = PartitionTable::new();
/// table.append(3);
/// table.append(2);
/// let graph = GraphSpec::default().with_undirected_storage(UndirectedStorage::Single);
/// let bulk = NonZeroUsize::new(4).expect("non-zero");
/// let connector = InterPartEdgeConnector::new(&graph, 5, 0.0, 0.0, bulk)?;
/// let sink = MemorySink::default();
/// connector.connect(&table, &mut SmallRng::seed_from_u64(0), &sink, &CancellationToken::new())?;
/// assert_eq!(sink.edges().len(), 6);
/// # Ok::<(), cliquegen_core::GeneratorError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct InterPartEdgeConnector<'a> {
    graph: &'a GraphSpec,
    total_vertices: u64,
    prob_missing_all: f64,
    prob_missing_one: f64,
    bulk_size: NonZeroUsize,
    policy: FlushPolicy,
}

impl<'a> InterPartEdgeConnector<'a> {
    /// Creates a connector for a run of `total_vertices` vertices.
    ///
    /// `prob_missing_all` omits a whole partition pair, `prob_missing_one`
    /// omits single edges of a connected pair.
    ///
    /// # Errors
    /// Returns [`crate::GeneratorError::InvalidProbability`] or
    /// [`crate::GeneratorError::PropertyListTooShort`].
    pub fn new(
        graph: &'a GraphSpec,
        total_vertices: u64,
        prob_missing_all: f64,
        prob_missing_one: f64,
        bulk_size: NonZeroUsize,
    ) -> Result<Self> {
        check_probability("prob_missing_all", prob_missing_all)?;
        check_probability("prob_missing_one_between", prob_missing_one)?;
        let n = u128::from(total_vertices);
        graph.edge_property.require_len(PropertyTarget::Edge, n * n)?;
        Ok(Self {
            graph,
            total_vertices,
            prob_missing_all,
            prob_missing_one,
            bulk_size,
            policy: FlushPolicy::WhenFull,
        })
    }

    /// Flushes after every partition row instead of packing batches.
    #[must_use]
    pub const fn with_row_flush(mut self, enabled: bool) -> Self {
        self.policy = if enabled {
            FlushPolicy::EveryRow
        } else {
            FlushPolicy::WhenFull
        };
        self
    }

    /// Connects every partition pair of `table`.
    ///
    /// # Errors
    /// Returns [`crate::GeneratorError::Sink`] or
    /// [`crate::GeneratorError::Cancelled`] from a flush.
    pub fn connect<S, R>(
        &self,
        table: &PartitionTable,
        rng: &mut R,
        sink: &S,
        cancel: &CancellationToken,
    ) -> Result<BatchStats>
    where
        S: BulkSink + ?Sized,
        R: Rng,
    {
        let rows = WorkRange::new(0, table.num_partitions() as u64);
        self.connect_rows(table, rows, rng, sink, cancel)
    }

    /// Connects the pairs owned by the partition indices in `rows`.
    ///
    /// # Errors
    /// Same as [`Self::connect`].
    pub fn connect_rows<S, R>(
        &self,
        table: &PartitionTable,
        rows: WorkRange,
        rng: &mut R,
        sink: &S,
        cancel: &CancellationToken,
    ) -> Result<BatchStats>
    where
        S: BulkSink + ?Sized,
        R: Rng,
    {
        let writer = BatchWriter::<EdgeDocument, S>::new(sink, cancel, self.bulk_size, self.policy);
        let mut emitter = EdgeEmitter::new(self.graph, self.total_vertices, writer);

        let count = table.num_partitions();
        let clamp = |row: u64| usize::try_from(row).map_or(count, |row| row.min(count));
        for v in clamp(rows.lo)..clamp(rows.hi) {
            let Some(left) = table.range_of(v) else {
                continue;
            };
            for right in ((v + 1)..count).filter_map(|w| table.range_of(w)) {
                if rng.gen_bool(self.prob_missing_all) {
                    continue;
                }
                for a in left.indices() {
                    let from = VertexRef::in_part(a, Some(left.lo));
                    for b in right.indices() {
                        if rng.gen_bool(self.prob_missing_one) {
                            continue;
                        }
                        emitter.cross_pair(from, VertexRef::in_part(b, Some(right.lo)), rng)?;
                    }
                }
            }
            emitter.end_row()?;
        }
        emitter.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    use rand::{SeedableRng, rngs::SmallRng};
    use rstest::rstest;

    use crate::{shape::UndirectedStorage, sink::MemorySink};

    fn bulk(size: usize) -> NonZeroUsize {
        NonZeroUsize::new(size).expect("bulk size must be non-zero")
    }

    fn table(sizes: &[u64]) -> PartitionTable {
        let mut table = PartitionTable::new();
        for size in sizes {
            table.append(*size);
        }
        table
    }

    fn connect(graph: &GraphSpec, sizes: &[u64], p_all: f64, p_one: f64) -> MemorySink {
        let table = table(sizes);
        let sink = MemorySink::default();
        InterPartEdgeConnector::new(graph, table.total_vertices(), p_all, p_one, bulk(3))
            .expect("connector must build")
            .connect(
                &table,
                &mut SmallRng::seed_from_u64(5),
                &sink,
                &CancellationToken::new(),
            )
            .expect("connection must succeed");
        sink
    }

    #[test]
    fn two_parts_are_fully_connected() {
        let graph = GraphSpec::default().with_undirected_storage(UndirectedStorage::Single);
        let edges = connect(&graph, &[3, 2], 0.0, 0.0).edges();
        let pairs: HashSet<(u64, u64)> = edges.iter().map(EdgeDocument::endpoints).collect();
        let expected: HashSet<(u64, u64)> =
            (0..3).flat_map(|a| (3..5).map(move |b| (a, b))).collect();
        assert_eq!(edges.len(), 6);
        assert_eq!(pairs, expected);
    }

    #[test]
    fn endpoints_carry_their_partition_labels() {
        let graph = GraphSpec::default().with_undirected_storage(UndirectedStorage::Single);
        for edge in connect(&graph, &[3, 2], 0.0, 0.0).edges() {
            assert_eq!(edge.from.part, Some(0));
            assert_eq!(edge.to.part, Some(3));
        }
    }

    #[rstest]
    #[case(1.0, 0.0)]
    #[case(0.0, 1.0)]
    fn certain_omission_yields_nothing(#[case] p_all: f64, #[case] p_one: f64) {
        let edges = connect(&GraphSpec::default(), &[2, 3, 4], p_all, p_one).edges();
        assert!(edges.is_empty());
    }

    #[test]
    fn directed_cross_edges_cover_each_pair_once() {
        let graph = GraphSpec::default().with_directed(true);
        let edges = connect(&graph, &[4, 4, 4], 0.0, 0.0).edges();
        assert_eq!(edges.len(), 48);
        let unordered: HashSet<(u64, u64)> = edges
            .iter()
            .map(|edge| {
                let (a, b) = edge.endpoints();
                (a.min(b), a.max(b))
            })
            .collect();
        assert_eq!(unordered.len(), 48);
        assert!(edges.iter().any(|edge| edge.from.id > edge.to.id));
    }

    #[test]
    fn mirrored_cross_edges_are_emitted_both_ways() {
        let edges = connect(&GraphSpec::default(), &[3, 2], 0.0, 0.0).edges();
        assert_eq!(edges.len(), 12);
    }

    #[test]
    fn row_splits_compose_to_all_pairs() {
        let graph = GraphSpec::default().with_undirected_storage(UndirectedStorage::Single);
        let table = table(&[2, 2, 2, 2]);
        let connector = InterPartEdgeConnector::new(&graph, 8, 0.0, 0.0, bulk(5))
            .expect("connector must build");
        let sink = MemorySink::default();
        let cancel = CancellationToken::new();
        for rows in [WorkRange::new(0, 1), WorkRange::new(1, 4)] {
            connector
                .connect_rows(&table, rows, &mut SmallRng::seed_from_u64(2), &sink, &cancel)
                .expect("connection must succeed");
        }
        assert_eq!(sink.edges().len(), 6 * 4);
    }

    #[rstest]
    #[case::past_the_end(WorkRange::new(3, u64::MAX), 0)]
    #[case::straddling(WorkRange::new(1, 10), 1)]
    #[case::empty(WorkRange::new(7, 9), 0)]
    fn rows_beyond_the_table_are_ignored(#[case] rows: WorkRange, #[case] pairs: usize) {
        let graph = GraphSpec::default().with_undirected_storage(UndirectedStorage::Single);
        let table = table(&[1, 1, 1]);
        let connector = InterPartEdgeConnector::new(&graph, 3, 0.0, 0.0, bulk(2))
            .expect("connector must build");
        let sink = MemorySink::default();
        let stats = connector
            .connect_rows(
                &table,
                rows,
                &mut SmallRng::seed_from_u64(1),
                &sink,
                &CancellationToken::new(),
            )
            .expect("connection must succeed");
        assert_eq!(sink.edges().len(), pairs);
        assert_eq!(stats.documents, pairs as u64);
    }
}
