//! Bounded batching shared by the vertex producer and both edge enumerators.
//!
//! A [`BatchWriter`] never holds more than `bulk_size` documents: it commits
//! as soon as the buffer is full, optionally at row boundaries, and once more
//! on [`BatchWriter::finish`] so no partial batch is lost.

use std::{num::NonZeroUsize, sync::Arc};

use crate::{
    Result,
    cancel::CancellationToken,
    error::GeneratorError,
    sink::{BatchDocument, BulkSink},
};

/// Counters reported by a finished [`BatchWriter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Number of documents committed.
    pub documents: u64,
    /// Number of batches committed.
    pub batches: u64,
}

impl BatchStats {
    /// Adds another writer's counters.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            documents: self.documents + other.documents,
            batches: self.batches + other.batches,
        }
    }
}

/// When a [`BatchWriter`] commits besides reaching `bulk_size`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Commit only full batches plus the final remainder.
    #[default]
    WhenFull,
    /// Additionally commit whatever is buffered at every row boundary.
    EveryRow,
}

/// Buffer of documents bound to one sink and one cancellation token.
pub struct BatchWriter<'a, T: BatchDocument, S: BulkSink + ?Sized> {
    sink: &'a S,
    cancel: &'a CancellationToken,
    bulk_size: NonZeroUsize,
    policy: FlushPolicy,
    buffer: Vec<T>,
    stats: BatchStats,
}

impl<'a, T: BatchDocument, S: BulkSink + ?Sized> BatchWriter<'a, T, S> {
    /// Creates an empty writer.
    #[must_use]
    pub fn new(
        sink: &'a S,
        cancel: &'a CancellationToken,
        bulk_size: NonZeroUsize,
        policy: FlushPolicy,
    ) -> Self {
        Self {
            sink,
            cancel,
            bulk_size,
            policy,
            buffer: Vec::with_capacity(bulk_size.get().min(64 * 1024)),
            stats: BatchStats::default(),
        }
    }

    /// Buffers one document, committing when the buffer is full.
    ///
    /// # Errors
    /// Returns [`GeneratorError::Cancelled`] if the run was cancelled and
    /// [`GeneratorError::Sink`] if the commit fails.
    pub fn push(&mut self, document: T) -> Result<()> {
        self.buffer.push(document);
        if self.buffer.len() >= self.bulk_size.get() {
            self.flush()?;
        }
        Ok(())
    }

    /// Marks the end of an outer row.
    ///
    /// # Errors
    /// Same as [`Self::push`].
    pub fn end_row(&mut self) -> Result<()> {
        match self.policy {
            FlushPolicy::EveryRow => self.flush(),
            FlushPolicy::WhenFull => Ok(()),
        }
    }

    /// Commits the remainder and returns the writer's counters.
    ///
    /// # Errors
    /// Same as [`Self::push`].
    pub fn finish(mut self) -> Result<BatchStats> {
        self.flush()?;
        Ok(self.stats)
    }

    fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        if self.cancel.is_cancelled() {
            return Err(GeneratorError::Cancelled);
        }
        self.sink
            .commit(T::as_batch(&self.buffer))
            .map_err(|error| GeneratorError::Sink {
                sink: Arc::from(self.sink.name()),
                error,
            })?;
        self.stats.documents += self.buffer.len() as u64;
        self.stats.batches += 1;
        self.buffer.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::{
        document::VertexDocument,
        sink::MemorySink,
        test_utils::{FailingSink, vertex},
    };

    fn bulk(size: usize) -> NonZeroUsize {
        NonZeroUsize::new(size).expect("bulk size must be non-zero")
    }

    #[rstest]
    #[case(FlushPolicy::WhenFull, vec![2, 2, 1])]
    #[case(FlushPolicy::EveryRow, vec![2, 1, 2])]
    fn flush_policy_shapes_batches(#[case] policy: FlushPolicy, #[case] expected: Vec<usize>) {
        let sink = MemorySink::default();
        let cancel = CancellationToken::new();
        let mut writer = BatchWriter::<VertexDocument, _>::new(&sink, &cancel, bulk(2), policy);
        for row in [vec![0, 1, 2], vec![3, 4]] {
            for id in row {
                writer.push(vertex(id)).expect("push must succeed");
            }
            writer.end_row().expect("row flush must succeed");
        }
        let stats = writer.finish().expect("finish must succeed");
        assert_eq!(sink.vertex_batch_sizes(), expected);
        assert_eq!(stats.documents, 5);
        assert_eq!(usize::try_from(stats.batches).ok(), Some(expected.len()));
    }

    #[test]
    fn finish_commits_partial_batch() {
        let sink = MemorySink::default();
        let cancel = CancellationToken::new();
        let mut writer =
            BatchWriter::<VertexDocument, _>::new(&sink, &cancel, bulk(10), FlushPolicy::WhenFull);
        writer.push(vertex(7)).expect("push must succeed");
        assert!(sink.vertices().is_empty());
        writer.finish().expect("finish must succeed");
        assert_eq!(sink.vertices(), vec![vertex(7)]);
    }

    #[test]
    fn cancelled_writer_refuses_to_commit() {
        let sink = MemorySink::default();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut writer =
            BatchWriter::<VertexDocument, _>::new(&sink, &cancel, bulk(1), FlushPolicy::WhenFull);
        let err = writer.push(vertex(0)).expect_err("cancelled writer must fail");
        assert_eq!(err, GeneratorError::Cancelled);
        assert!(sink.vertices().is_empty());
    }

    #[test]
    fn sink_failures_name_the_sink() {
        let sink = FailingSink::after(0);
        let cancel = CancellationToken::new();
        let mut writer =
            BatchWriter::<VertexDocument, _>::new(&sink, &cancel, bulk(1), FlushPolicy::WhenFull);
        let err = writer.push(vertex(0)).expect_err("failing sink must fail");
        match err {
            GeneratorError::Sink { sink, .. } => assert_eq!(&*sink, "failing"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
