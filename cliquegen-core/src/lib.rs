//! Cliquegen core library.
//!
//! Generates single cliques, cliques-graphs and k-partite graphs and streams
//! them in bounded batches to a [`BulkSink`].
#![cfg_attr(docsrs, feature(doc_cfg))]

mod batch;
mod builder;
mod cancel;
mod clique_edges;
mod dispatch;
mod document;
mod emit;
mod error;
mod generator;
mod inter_part;
mod partition_table;
mod partitioner;
mod property;
mod shape;
mod sink;
mod vertices;

#[cfg(test)]
mod test_utils;

pub use crate::{
    batch::BatchStats,
    builder::{DEFAULT_BULK_SIZE, GeneratorBuilder},
    cancel::CancellationToken,
    clique_edges::{CliqueEdgeEnumerator, CliqueSelection},
    document::{EdgeDocument, PropertyValue, VertexDocument, VertexId, VertexRef},
    error::{GeneratorError, GeneratorErrorCode, Result, SinkError, SinkErrorCode},
    generator::{GenerationSummary, Generator},
    inter_part::InterPartEdgeConnector,
    partition_table::PartitionTable,
    partitioner::{PARALLEL_WORK_PER_WORKER, WorkPartitioner, WorkRange, triangular},
    property::{PropertySpec, PropertyTarget, edge_index},
    shape::{GraphShape, GraphSpec, PartitionedParams, UndirectedStorage},
    sink::{Batch, BatchDocument, BulkSink, CountingSink, MemorySink, Role},
    vertices::{IdCursor, VertexBatchProducer},
};
