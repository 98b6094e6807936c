#![allow(dead_code, reason = "each integration test binary uses a subset of helpers")]

use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use cliquegen_core::{
    Batch, BulkSink, EdgeDocument, Generator, GeneratorBuilder, GraphSpec, MemorySink, Role,
    SinkError,
};

/// Builds a generator with a fixed seed.
#[must_use]
pub fn generator(graph: GraphSpec, workers: usize, bulk_size: usize) -> Generator {
    GeneratorBuilder::new()
        .with_graph(graph)
        .with_workers(workers)
        .with_bulk_size(bulk_size)
        .with_seed(0x5EED)
        .build()
        .expect("generator configuration is valid")
}

/// Edge endpoints as ordered `(from, to)` pairs.
#[must_use]
pub fn directed_pairs(edges: &[EdgeDocument]) -> HashSet<(u64, u64)> {
    edges.iter().map(EdgeDocument::endpoints).collect()
}

/// Edge endpoints with the smaller id first.
#[must_use]
pub fn unordered_pairs(edges: &[EdgeDocument]) -> HashSet<(u64, u64)> {
    edges
        .iter()
        .map(|edge| {
            let (a, b) = edge.endpoints();
            (a.min(b), a.max(b))
        })
        .collect()
}

/// Sink that stores vertices but rejects every edge batch after the first
/// `accepted` ones.
#[derive(Default)]
pub struct EdgeRejectingSink {
    pub inner: MemorySink,
    accepted: AtomicUsize,
    limit: usize,
}

impl EdgeRejectingSink {
    #[must_use]
    pub fn after(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }
}

impl BulkSink for EdgeRejectingSink {
    fn name(&self) -> &str {
        "edge-rejecting"
    }

    fn commit(&self, batch: Batch<'_>) -> Result<(), SinkError> {
        if batch.role() == Role::Edge && self.accepted.fetch_add(1, Ordering::SeqCst) >= self.limit {
            return Err(SinkError::Rejected {
                role: Role::Edge,
                documents: batch.len(),
                reason: Arc::from("edge collection is read-only"),
            });
        }
        self.inner.commit(batch)
    }
}
