//! Balanced decomposition of triangular work across a fixed worker count.
//!
//! Row `i` of an outer range `[lo, hi)` owns `hi - i - 1` units of work (its
//! partners `j` with `i < j < hi`). Splitting rows evenly would hand the first
//! worker almost all of the work, so each cut is placed by solving the
//! triangular-sum equation in closed form with an integer square root.

use std::{fmt, num::NonZeroUsize, ops::Range};

/// Total work below which `split` keeps a single range, per worker.
pub const PARALLEL_WORK_PER_WORKER: u128 = 100;

/// Half-open interval `[lo, hi)` over an index space.
///
/// # Examples
/// ```
/// use cliquegen_core::WorkRange;
///
/// let range = WorkRange::new(2, 5);
/// assert_eq!(range.len(), 3);
/// assert!(range.contains(4));
/// assert!(!range.contains(5));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorkRange {
    /// Inclusive lower bound.
    pub lo: u64,
    /// Exclusive upper bound.
    pub hi: u64,
}

impl WorkRange {
    /// Creates a range; `hi` is clamped so the range is never inverted.
    #[must_use]
    pub const fn new(lo: u64, hi: u64) -> Self {
        Self {
            lo,
            hi: if hi < lo { lo } else { hi },
        }
    }

    /// Number of indices in the range.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.hi - self.lo
    }

    /// Whether the range holds no index.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.hi == self.lo
    }

    /// Whether `index` lies in the range.
    #[must_use]
    pub const fn contains(&self, index: u64) -> bool {
        self.lo <= index && index < self.hi
    }

    /// Iterates the indices of the range.
    #[must_use]
    pub const fn indices(&self) -> Range<u64> {
        self.lo..self.hi
    }
}

impl From<Range<u64>> for WorkRange {
    fn from(range: Range<u64>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl fmt::Display for WorkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.lo, self.hi)
    }
}

/// Number of unordered pairs among `n` items.
#[must_use]
pub const fn triangular(n: u64) -> u128 {
    let n = n as u128;
    if n == 0 { 0 } else { n * (n - 1) / 2 }
}

/// Work of the first `rows` rows when `remaining` rows are left to the end of
/// the outer range: `(remaining - 1) + (remaining - 2) + ...`.
const fn prefix_work(remaining: u64, rows: u64) -> u128 {
    let m = remaining as u128;
    let k = rows as u128;
    if k == 0 {
        return 0;
    }
    k * (2 * m - 1 - k) / 2
}

/// Splits triangular work into balanced contiguous ranges.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use cliquegen_core::{WorkPartitioner, WorkRange};
///
/// let workers = NonZeroUsize::new(4).expect("non-zero");
/// let ranges = WorkPartitioner::new(workers).split(WorkRange::new(0, 200));
/// assert_eq!(ranges.len(), 4);
/// assert_eq!(ranges.first().map(|r| r.lo), Some(0));
/// assert_eq!(ranges.last().map(|r| r.hi), Some(200));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkPartitioner {
    workers: NonZeroUsize,
}

impl WorkPartitioner {
    /// Creates a partitioner for `workers` workers.
    #[must_use]
    pub const fn new(workers: NonZeroUsize) -> Self {
        Self { workers }
    }

    /// Splits the rows of `outer` into ranges of near-equal triangular work.
    ///
    /// Returns a single range when the total work is smaller than the
    /// per-worker threshold times the worker count. Otherwise returns exactly
    /// `workers` contiguous ranges; the last one always ends at `outer.hi`.
    /// Each range's work deviates from the ideal average by less than one
    /// row's work.
    #[must_use]
    pub fn split(&self, outer: WorkRange) -> Vec<WorkRange> {
        let workers = self.workers.get();
        let total = triangular(outer.len());
        if workers == 1 || total < PARALLEL_WORK_PER_WORKER * workers as u128 {
            return vec![outer];
        }

        let mut ranges = Vec::with_capacity(workers);
        let mut start = outer.lo;
        let mut remaining_work = total;
        for worker in 0..workers {
            let left = (workers - worker) as u128;
            if left == 1 {
                ranges.push(WorkRange::new(start, outer.hi));
                break;
            }
            let remaining_rows = outer.hi - start;
            let rows = rows_for_target(remaining_rows, remaining_work / left);
            ranges.push(WorkRange::new(start, start + rows));
            remaining_work -= prefix_work(remaining_rows, rows);
            start += rows;
        }
        ranges
    }
}

/// Number of leading rows whose work is closest to `target`.
///
/// Solves `k * (2m - 1 - k) / 2 = target` for `k`, i.e.
/// `k = ((2m - 1) - sqrt((2m - 1)^2 - 8 * target)) / 2`, then picks the best
/// of the integer neighbours of the root.
fn rows_for_target(remaining: u64, target: u128) -> u64 {
    if remaining == 0 {
        return 0;
    }
    let b = 2 * remaining as u128 - 1;
    let Some(discriminant) = (b * b).checked_sub(8 * target) else {
        return remaining;
    };
    let root = (b - discriminant.isqrt()) / 2;
    let approx = u64::try_from(root).unwrap_or(remaining).min(remaining);

    [approx.saturating_sub(1), approx, approx.saturating_add(1)]
        .into_iter()
        .filter(|rows| *rows <= remaining)
        .min_by_key(|rows| prefix_work(remaining, *rows).abs_diff(target))
        .unwrap_or(approx)
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rstest::rstest;

    use crate::test_utils::suite_proptest_config;

    fn workers(count: usize) -> NonZeroUsize {
        NonZeroUsize::new(count).expect("worker count must be non-zero")
    }

    fn range_work(range: WorkRange, hi: u64) -> u128 {
        range
            .indices()
            .map(|row| u128::from(hi - row - 1))
            .sum()
    }

    fn assert_exact_cover(ranges: &[WorkRange], outer: WorkRange) {
        assert_eq!(ranges.first().map(|r| r.lo), Some(outer.lo));
        assert_eq!(ranges.last().map(|r| r.hi), Some(outer.hi));
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].hi, pair[1].lo, "ranges must be contiguous");
        }
        let covered: u64 = ranges.iter().map(WorkRange::len).sum();
        assert_eq!(covered, outer.len());
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(10)]
    fn small_inputs_stay_in_one_range(#[case] n: u64) {
        let ranges = WorkPartitioner::new(workers(8)).split(WorkRange::new(0, n));
        assert_eq!(ranges, vec![WorkRange::new(0, n)]);
    }

    #[test]
    fn single_worker_never_splits() {
        let ranges = WorkPartitioner::new(workers(1)).split(WorkRange::new(5, 5_000));
        assert_eq!(ranges, vec![WorkRange::new(5, 5_000)]);
    }

    #[test]
    fn balance_stays_within_one_row_for_thousand_rows() {
        let n = 1_000;
        let ranges = WorkPartitioner::new(workers(8)).split(WorkRange::new(0, n));
        assert_eq!(ranges.len(), 8);
        assert_exact_cover(&ranges, WorkRange::new(0, n));

        let ideal = triangular(n) / 8;
        for range in &ranges {
            let work = range_work(*range, n);
            assert!(
                work.abs_diff(ideal) < u128::from(n - 1),
                "range {range} has work {work}, ideal {ideal}",
            );
        }
    }

    #[test]
    fn early_ranges_are_shorter_than_late_ranges() {
        let ranges = WorkPartitioner::new(workers(4)).split(WorkRange::new(0, 200));
        let lengths: Vec<u64> = ranges.iter().map(WorkRange::len).collect();
        assert!(lengths.windows(2).all(|w| w[0] <= w[1]), "{lengths:?}");
    }

    #[test]
    fn offset_ranges_are_balanced_like_zero_based_ones() {
        let shifted = WorkPartitioner::new(workers(4)).split(WorkRange::new(1_000, 1_200));
        let based = WorkPartitioner::new(workers(4)).split(WorkRange::new(0, 200));
        let shifted_lengths: Vec<u64> = shifted.iter().map(WorkRange::len).collect();
        let based_lengths: Vec<u64> = based.iter().map(WorkRange::len).collect();
        assert_eq!(shifted_lengths, based_lengths);
    }

    #[test]
    fn rows_for_target_takes_everything_for_oversized_targets() {
        assert_eq!(rows_for_target(10, 1_000), 10);
        assert_eq!(rows_for_target(0, 5), 0);
        assert_eq!(rows_for_target(10, 0), 0);
    }

    proptest! {
        #![proptest_config(suite_proptest_config(128))]

        #[test]
        fn split_covers_outer_range_exactly(
            lo in 0u64..10_000,
            n in 0u64..4_000,
            count in 1usize..64,
        ) {
            let outer = WorkRange::new(lo, lo + n);
            let ranges = WorkPartitioner::new(workers(count)).split(outer);
            prop_assert!(ranges.len() == 1 || ranges.len() == count);
            prop_assert_eq!(ranges.first().map(|r| r.lo), Some(outer.lo));
            prop_assert_eq!(ranges.last().map(|r| r.hi), Some(outer.hi));
            for pair in ranges.windows(2) {
                prop_assert_eq!(pair[0].hi, pair[1].lo);
            }
            let covered: u64 = ranges.iter().map(WorkRange::len).sum();
            prop_assert_eq!(covered, n);
        }

        #[test]
        fn split_work_deviates_less_than_one_row(
            n in 2u64..3_000,
            count in 2usize..32,
        ) {
            let outer = WorkRange::new(0, n);
            let ranges = WorkPartitioner::new(workers(count)).split(outer);
            prop_assume!(ranges.len() > 1);
            let total = triangular(n);
            for range in &ranges {
                let work = range_work(*range, n) * count as u128;
                prop_assert!(work.abs_diff(total) < u128::from(n - 1) * count as u128);
            }
        }
    }
}
