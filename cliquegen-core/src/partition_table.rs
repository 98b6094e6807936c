//! Append-only table of partition boundaries.
//!
//! Each clique or part occupies one contiguous id range. The table stores the
//! starting id of every partition followed by the running total of issued
//! ids, so the last entry describes a partition that is still open.

use crate::{document::VertexId, partitioner::WorkRange};

/// Ordered partition boundaries, first element `0`, strictly increasing for
/// closed partitions.
///
/// # Examples
/// ```
/// use cliquegen_core::PartitionTable;
///
/// let mut table = PartitionTable::new();
/// table.append(3);
/// table.append(2);
/// assert_eq!(table.num_partitions(), 2);
/// assert_eq!(table.size_of(0), Some(3));
/// assert_eq!(table.size_of(1), Some(2));
/// assert_eq!(table.size_of(2), Some(0));
/// assert_eq!(table.total_vertices(), 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionTable {
    boundaries: Vec<VertexId>,
    running_total: VertexId,
}

impl Default for PartitionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PartitionTable {
    /// Creates a table with no closed partition.
    #[must_use]
    pub fn new() -> Self {
        Self {
            boundaries: vec![0],
            running_total: 0,
        }
    }

    /// Closes a new partition of `size` ids starting at the running total.
    pub fn append(&mut self, size: u64) {
        self.extend_open(size);
        self.close_open();
    }

    /// Grows the still-open partition by `count` ids.
    pub fn extend_open(&mut self, count: u64) {
        self.running_total += count;
    }

    /// Closes the still-open partition at the running total.
    pub fn close_open(&mut self) {
        self.boundaries.push(self.running_total);
    }

    /// Size of partition `index`.
    ///
    /// For the still-open last entry this is the running total minus its
    /// start. Returns `None` past the open entry.
    #[must_use]
    pub fn size_of(&self, index: usize) -> Option<u64> {
        let start = *self.boundaries.get(index)?;
        let end = self
            .boundaries
            .get(index + 1)
            .copied()
            .unwrap_or(self.running_total);
        Some(end - start)
    }

    /// Number of closed partitions.
    #[must_use]
    pub fn num_partitions(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Starting id of partition `index`, including the open entry.
    #[must_use]
    pub fn start_of(&self, index: usize) -> Option<VertexId> {
        self.boundaries.get(index).copied()
    }

    /// Id range of closed partition `index`.
    #[must_use]
    pub fn range_of(&self, index: usize) -> Option<WorkRange> {
        let lo = *self.boundaries.get(index)?;
        let hi = *self.boundaries.get(index + 1)?;
        Some(WorkRange::new(lo, hi))
    }

    /// Index of the closed partition containing `id`.
    ///
    /// # Examples
    /// ```
    /// use cliquegen_core::PartitionTable;
    ///
    /// let mut table = PartitionTable::new();
    /// table.append(3);
    /// table.append(2);
    /// assert_eq!(table.partition_of(0), Some(0));
    /// assert_eq!(table.partition_of(4), Some(1));
    /// assert_eq!(table.partition_of(5), None);
    /// ```
    #[must_use]
    pub fn partition_of(&self, id: VertexId) -> Option<usize> {
        let closed_end = *self.boundaries.last()?;
        if id >= closed_end {
            return None;
        }
        let index = self.boundaries.partition_point(|start| *start <= id);
        index.checked_sub(1)
    }

    /// Total number of ids issued, open partition included.
    #[must_use]
    pub const fn total_vertices(&self) -> u64 {
        self.running_total
    }

    /// Iterates the id ranges of all closed partitions in table order.
    pub fn ranges(&self) -> impl Iterator<Item = WorkRange> + '_ {
        self.boundaries
            .windows(2)
            .map(|pair| WorkRange::new(pair[0], pair[1]))
    }
}
