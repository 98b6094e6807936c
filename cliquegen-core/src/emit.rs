//! Edge orientation and property attachment on top of [`BatchWriter`].

use rand::Rng;

use crate::{
    Result,
    batch::{BatchStats, BatchWriter},
    document::{EdgeDocument, VertexRef},
    shape::GraphSpec,
    sink::BulkSink,
};

/// Turns accepted candidate pairs into edge documents.
pub(crate) struct EdgeEmitter<'a, S: BulkSink + ?Sized> {
    graph: &'a GraphSpec,
    total_vertices: u64,
    writer: BatchWriter<'a, EdgeDocument, S>,
}

impl<'a, S: BulkSink + ?Sized> EdgeEmitter<'a, S> {
    pub(crate) fn new(
        graph: &'a GraphSpec,
        total_vertices: u64,
        writer: BatchWriter<'a, EdgeDocument, S>,
    ) -> Self {
        Self {
            graph,
            total_vertices,
            writer,
        }
    }

    /// Emits the pair `from -> to`, plus `to -> from` when undirected pairs
    /// are mirrored.
    pub(crate) fn pair<R: Rng>(&mut self, from: VertexRef, to: VertexRef, rng: &mut R) -> Result<()> {
        let property = self
            .graph
            .edge_property
            .edge_value(from.id, to.id, self.total_vertices, rng);
        if self.graph.mirrors_pairs() {
            self.writer.push(EdgeDocument {
                from,
                to,
                property: property.clone(),
            })?;
            self.writer.push(EdgeDocument {
                from: to,
                to: from,
                property,
            })
        } else {
            self.writer.push(EdgeDocument { from, to, property })
        }
    }

    /// Emits the pair in a direction drawn per edge when the run is directed.
    pub(crate) fn cross_pair<R: Rng>(
        &mut self,
        a: VertexRef,
        b: VertexRef,
        rng: &mut R,
    ) -> Result<()> {
        if self.graph.directed && rng.gen_bool(0.5) {
            self.pair(b, a, rng)
        } else {
            self.pair(a, b, rng)
        }
    }

    /// Emits the single `v -> v` edge.
    pub(crate) fn self_loop<R: Rng>(&mut self, v: VertexRef, rng: &mut R) -> Result<()> {
        let property = self
            .graph
            .edge_property
            .edge_value(v.id, v.id, self.total_vertices, rng);
        self.writer.push(EdgeDocument {
            from: v,
            to: v,
            property,
        })
    }

    pub(crate) fn end_row(&mut self) -> Result<()> {
        self.writer.end_row()
    }

    pub(crate) fn finish(self) -> Result<BatchStats> {
        self.writer.finish()
    }
}
