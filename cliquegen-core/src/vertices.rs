//! Sequential vertex issuance.

use std::num::NonZeroUsize;

use rand::Rng;

use crate::{
    Result,
    batch::{BatchStats, BatchWriter, FlushPolicy},
    cancel::CancellationToken,
    document::{VertexDocument, VertexId},
    partitioner::WorkRange,
    property::PropertySpec,
    sink::BulkSink,
};

/// The single global vertex-id cursor of a run.
///
/// Only [`VertexBatchProducer::produce`] advances it, and only after a whole
/// block has been committed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdCursor {
    next: VertexId,
}

impl IdCursor {
    /// Creates a cursor positioned at id `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Next id to be issued.
    #[must_use]
    pub const fn position(&self) -> VertexId {
        self.next
    }
}

/// Issues contiguous id blocks as bounded vertex batches.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use cliquegen_core::{
///     CancellationToken, IdCursor, MemorySink, PropertySpec, VertexBatchProducer,
/// };
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let property = PropertySpec::None;
/// let bulk = NonZeroUsize::new(2).expect("non-zero");
/// let producer = VertexBatchProducer::new(&property, bulk).with_partition_labels(true);
/// let sink = MemorySink::default();
/// let mut cursor = IdCursor::new();
/// let mut rng = SmallRng::seed_from_u64(0);
/// let cancel = CancellationToken::new();
///
/// producer.produce(&mut cursor, 3, &mut rng, &sink, &cancel)?;
/// producer.produce(&mut cursor, 2, &mut rng, &sink, &cancel)?;
/// assert_eq!(cursor.position(), 5);
/// assert_eq!(sink.vertices()[4].part, Some(3));
/// # Ok::<(), cliquegen_core::GeneratorError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct VertexBatchProducer<'a> {
    property: &'a PropertySpec,
    bulk_size: NonZeroUsize,
    partition_labels: bool,
}

impl<'a> VertexBatchProducer<'a> {
    /// Creates a producer without partition labels.
    #[must_use]
    pub const fn new(property: &'a PropertySpec, bulk_size: NonZeroUsize) -> Self {
        Self {
            property,
            bulk_size,
            partition_labels: false,
        }
    }

    /// Attaches the block's starting id to every vertex as its partition label.
    #[must_use]
    pub const fn with_partition_labels(mut self, enabled: bool) -> Self {
        self.partition_labels = enabled;
        self
    }

    /// Issues `size` vertices starting at the cursor.
    ///
    /// Returns the issued id range and the batch counters. The cursor moves
    /// by exactly `size` once every batch of the block was committed and
    /// stays put on error.
    ///
    /// # Errors
    /// Returns [`crate::GeneratorError::Sink`] when a commit fails and
    /// [`crate::GeneratorError::Cancelled`] when the run was cancelled.
    pub fn produce<S, R>(
        &self,
        cursor: &mut IdCursor,
        size: u64,
        rng: &mut R,
        sink: &S,
        cancel: &CancellationToken,
    ) -> Result<(WorkRange, BatchStats)>
    where
        S: BulkSink + ?Sized,
        R: Rng,
    {
        let block = WorkRange::new(cursor.next, cursor.next + size);
        let part = self.partition_labels.then_some(block.lo);
        let mut writer =
            BatchWriter::<VertexDocument, S>::new(sink, cancel, self.bulk_size, FlushPolicy::WhenFull);
        for id in block.indices() {
            writer.push(VertexDocument {
                id,
                part,
                property: self.property.vertex_value(id, rng),
            })?;
        }
        let stats = writer.finish()?;
        cursor.next = block.hi;
        Ok((block, stats))
    }
}
