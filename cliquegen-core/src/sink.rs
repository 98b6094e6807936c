//! Bulk sink abstraction consumed by the generator.
//!
//! A sink receives bounded batches of vertex or edge documents and must apply
//! each batch all-or-nothing. Workers call [`BulkSink::commit`] concurrently,
//! so implementations are `Sync`.

use std::{
    fmt,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::{
    document::{EdgeDocument, VertexDocument},
    error::SinkError,
};

/// Role of a batch at the sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The batch holds vertex documents.
    Vertex,
    /// The batch holds edge documents.
    Edge,
}

impl Role {
    /// Returns a lowercase label for logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Edge => "edge",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A borrowed batch of documents handed to a sink.
#[derive(Clone, Copy, Debug)]
pub enum Batch<'a> {
    /// Vertex documents.
    Vertices(&'a [VertexDocument]),
    /// Edge documents.
    Edges(&'a [EdgeDocument]),
}

impl Batch<'_> {
    /// Returns the role of the documents in this batch.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Vertices(_) => Role::Vertex,
            Self::Edges(_) => Role::Edge,
        }
    }

    /// Returns the number of documents in this batch.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Vertices(docs) => docs.len(),
            Self::Edges(docs) => docs.len(),
        }
    }

    /// Returns whether the batch holds no documents.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Document types that can be buffered and committed as a [`Batch`].
pub trait BatchDocument: Sized + Send {
    /// Wraps a slice of documents into a [`Batch`].
    fn as_batch(documents: &[Self]) -> Batch<'_>;
}

impl BatchDocument for VertexDocument {
    fn as_batch(documents: &[Self]) -> Batch<'_> {
        Batch::Vertices(documents)
    }
}

impl BatchDocument for EdgeDocument {
    fn as_batch(documents: &[Self]) -> Batch<'_> {
        Batch::Edges(documents)
    }
}

/// Destination for generated documents.
///
/// # Examples
/// ```
/// use cliquegen_core::{Batch, BulkSink, SinkError};
///
/// struct Discard;
///
/// impl BulkSink for Discard {
///     fn name(&self) -> &str { "discard" }
///     fn commit(&self, _batch: Batch<'_>) -> Result<(), SinkError> { Ok(()) }
/// }
///
/// let sink = Discard;
/// assert_eq!(sink.name(), "discard");
/// assert!(sink.commit(Batch::Edges(&[])).is_ok());
/// ```
pub trait BulkSink: Sync {
    /// Returns a human-readable name used in errors and logs.
    fn name(&self) -> &str;

    /// Commits one batch.
    ///
    /// # Errors
    /// Returns a [`SinkError`] when the batch could not be applied. A failed
    /// commit must leave no document of the batch visible.
    fn commit(&self, batch: Batch<'_>) -> Result<(), SinkError>;
}

impl<S: BulkSink + ?Sized> BulkSink for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn commit(&self, batch: Batch<'_>) -> Result<(), SinkError> {
        (**self).commit(batch)
    }
}

/// Sink that keeps every committed batch in memory.
///
/// Intended for tests and small runs.
///
/// # Examples
/// ```
/// use cliquegen_core::{Batch, BulkSink, MemorySink, VertexDocument};
///
/// let sink = MemorySink::default();
/// let docs = [VertexDocument { id: 0, part: None, property: None }];
/// sink.commit(Batch::Vertices(&docs))?;
/// assert_eq!(sink.vertices().len(), 1);
/// assert_eq!(sink.vertex_batch_sizes(), vec![1]);
/// # Ok::<(), cliquegen_core::SinkError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    vertex_batches: Mutex<Vec<Vec<VertexDocument>>>,
    edge_batches: Mutex<Vec<Vec<EdgeDocument>>>,
}

impl MemorySink {
    /// Returns every committed vertex in commit order.
    #[must_use]
    pub fn vertices(&self) -> Vec<VertexDocument> {
        lock_or_recover(&self.vertex_batches)
            .iter()
            .flatten()
            .cloned()
            .collect()
    }

    /// Returns every committed edge in commit order.
    #[must_use]
    pub fn edges(&self) -> Vec<EdgeDocument> {
        lock_or_recover(&self.edge_batches)
            .iter()
            .flatten()
            .cloned()
            .collect()
    }

    /// Returns the size of each committed vertex batch.
    #[must_use]
    pub fn vertex_batch_sizes(&self) -> Vec<usize> {
        lock_or_recover(&self.vertex_batches)
            .iter()
            .map(Vec::len)
            .collect()
    }

    /// Returns the size of each committed edge batch.
    #[must_use]
    pub fn edge_batch_sizes(&self) -> Vec<usize> {
        lock_or_recover(&self.edge_batches)
            .iter()
            .map(Vec::len)
            .collect()
    }
}

impl BulkSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn commit(&self, batch: Batch<'_>) -> Result<(), SinkError> {
        match batch {
            Batch::Vertices(docs) => self
                .vertex_batches
                .lock()
                .map_err(|_| SinkError::Poisoned {
                    resource: "memory vertex batches",
                })?
                .push(docs.to_vec()),
            Batch::Edges(docs) => self
                .edge_batches
                .lock()
                .map_err(|_| SinkError::Poisoned {
                    resource: "memory edge batches",
                })?
                .push(docs.to_vec()),
        }
        Ok(())
    }
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Sink that accepts every batch and only counts documents.
///
/// # Examples
/// ```
/// use cliquegen_core::{Batch, BulkSink, CountingSink};
///
/// let sink = CountingSink::default();
/// sink.commit(Batch::Edges(&[]))?;
/// assert_eq!(sink.edge_batches(), 1);
/// assert_eq!(sink.edges(), 0);
/// # Ok::<(), cliquegen_core::SinkError>(())
/// ```
#[derive(Debug, Default)]
pub struct CountingSink {
    vertices: AtomicU64,
    edges: AtomicU64,
    vertex_batches: AtomicU64,
    edge_batches: AtomicU64,
}

impl CountingSink {
    /// Number of vertex documents accepted.
    #[must_use]
    pub fn vertices(&self) -> u64 {
        self.vertices.load(Ordering::Relaxed)
    }

    /// Number of edge documents accepted.
    #[must_use]
    pub fn edges(&self) -> u64 {
        self.edges.load(Ordering::Relaxed)
    }

    /// Number of vertex batches accepted.
    #[must_use]
    pub fn vertex_batches(&self) -> u64 {
        self.vertex_batches.load(Ordering::Relaxed)
    }

    /// Number of edge batches accepted.
    #[must_use]
    pub fn edge_batches(&self) -> u64 {
        self.edge_batches.load(Ordering::Relaxed)
    }
}

impl BulkSink for CountingSink {
    fn name(&self) -> &str {
        "counting"
    }

    fn commit(&self, batch: Batch<'_>) -> Result<(), SinkError> {
        let documents = batch.len() as u64;
        let (docs, batches) = match batch.role() {
            Role::Vertex => (&self.vertices, &self.vertex_batches),
            Role::Edge => (&self.edges, &self.edge_batches),
        };
        docs.fetch_add(documents, Ordering::Relaxed);
        batches.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
