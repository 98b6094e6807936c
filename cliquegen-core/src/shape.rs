//! Graph families and per-run graph options.

use std::fmt;

use crate::{
    Result,
    error::GeneratorError,
    property::{PropertySpec, PropertyTarget},
};

/// How undirected edges are stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UndirectedStorage {
    /// Two directed edges `i -> j` and `j -> i` carrying the same value.
    #[default]
    Mirrored,
    /// A single logical edge `i -> j`.
    Single,
}

/// Options fixed for a whole generation run.
///
/// # Examples
/// ```
/// use cliquegen_core::{GraphSpec, PropertySpec, UndirectedStorage};
///
/// let spec = GraphSpec::default()
///     .with_directed(true)
///     .with_edge_property(PropertySpec::Random { min: 0.0, max: 1.0 });
/// assert!(spec.directed);
/// assert_eq!(spec.undirected_storage, UndirectedStorage::Mirrored);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphSpec {
    /// Emit one `i -> i` edge per vertex.
    pub self_loops: bool,
    /// Emit directed edges.
    pub directed: bool,
    /// Storage of undirected edges; ignored for directed runs.
    pub undirected_storage: UndirectedStorage,
    /// Property attached to every vertex.
    pub vertex_property: PropertySpec,
    /// Property attached to every edge.
    pub edge_property: PropertySpec,
}

impl GraphSpec {
    /// Enables or disables self loops.
    #[must_use]
    pub fn with_self_loops(mut self, self_loops: bool) -> Self {
        self.self_loops = self_loops;
        self
    }

    /// Selects directed or undirected output.
    #[must_use]
    pub fn with_directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    /// Selects how undirected edges are stored.
    #[must_use]
    pub fn with_undirected_storage(mut self, storage: UndirectedStorage) -> Self {
        self.undirected_storage = storage;
        self
    }

    /// Sets the vertex property.
    #[must_use]
    pub fn with_vertex_property(mut self, property: PropertySpec) -> Self {
        self.vertex_property = property;
        self
    }

    /// Sets the edge property.
    #[must_use]
    pub fn with_edge_property(mut self, property: PropertySpec) -> Self {
        self.edge_property = property;
        self
    }

    /// Whether each undirected pair is emitted in both directions.
    #[must_use]
    pub fn mirrors_pairs(&self) -> bool {
        !self.directed && self.undirected_storage == UndirectedStorage::Mirrored
    }

    /// Checks random property bounds.
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidRandomBounds`] for unusable bounds.
    pub fn validate(&self) -> Result<()> {
        self.vertex_property.validate_bounds(PropertyTarget::Vertex)?;
        self.edge_property.validate_bounds(PropertyTarget::Edge)
    }

    /// Checks list properties against the largest vertex count of a run.
    ///
    /// Vertex lists are addressed by id and edge lists by `from * n + to`, so
    /// they need at least `n` and `n^2` values respectively.
    ///
    /// # Errors
    /// Returns [`GeneratorError::PropertyListTooShort`] when a list is short.
    pub fn check_lists(&self, max_vertices: u64) -> Result<()> {
        let n = u128::from(max_vertices);
        self.vertex_property.require_len(PropertyTarget::Vertex, n)?;
        self.edge_property.require_len(PropertyTarget::Edge, n * n)
    }
}

/// Parameters shared by the partitioned graph families.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartitionedParams {
    /// Number of cliques or parts.
    pub count: u64,
    /// Smallest partition size, inclusive.
    pub min_size: u64,
    /// Largest partition size, inclusive.
    pub max_size: u64,
    /// Omission probability of an edge inside a partition.
    pub prob_missing_one: f64,
    /// Omission probability of a whole partition pair.
    pub prob_missing_all: f64,
    /// Omission probability of an edge of a connected partition pair.
    pub prob_missing_one_between: f64,
}

impl PartitionedParams {
    /// Creates parameters for `count` partitions of `min_size..=max_size`
    /// vertices with every omission probability at zero.
    #[must_use]
    pub const fn new(count: u64, min_size: u64, max_size: u64) -> Self {
        Self {
            count,
            min_size,
            max_size,
            prob_missing_one: 0.0,
            prob_missing_all: 0.0,
            prob_missing_one_between: 0.0,
        }
    }

    /// Sets the intra-partition omission probability.
    #[must_use]
    pub const fn with_prob_missing_one(mut self, p: f64) -> Self {
        self.prob_missing_one = p;
        self
    }

    /// Sets the partition-pair omission probability.
    #[must_use]
    pub const fn with_prob_missing_all(mut self, p: f64) -> Self {
        self.prob_missing_all = p;
        self
    }

    /// Sets the cross-partition edge omission probability.
    #[must_use]
    pub const fn with_prob_missing_one_between(mut self, p: f64) -> Self {
        self.prob_missing_one_between = p;
        self
    }

    fn validate(&self, parameter: &'static str) -> Result<()> {
        if self.count == 0 || self.min_size == 0 || self.min_size > self.max_size {
            return Err(GeneratorError::InvalidSizeRange {
                parameter,
                min: self.min_size,
                max: self.max_size,
            });
        }
        check_probability("prob_missing_one", self.prob_missing_one)?;
        check_probability("prob_missing_all", self.prob_missing_all)?;
        check_probability("prob_missing_one_between", self.prob_missing_one_between)
    }
}

/// Graph family generated by a run.
///
/// # Examples
/// ```
/// use cliquegen_core::{GraphShape, PartitionedParams};
///
/// let shape = GraphShape::KPartite(PartitionedParams::new(3, 2, 4));
/// assert_eq!(shape.max_vertices(), 12);
/// assert!(shape.tracks_partitions());
/// assert!(shape.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GraphShape {
    /// One clique of `size` vertices.
    Clique {
        /// Number of vertices.
        size: u64,
        /// Omission probability of each edge.
        prob_missing: f64,
    },
    /// Cliques joined by probabilistic inter-clique edges.
    CliquesGraph(PartitionedParams),
    /// Parts without intra-part edges, densely connected to each other.
    KPartite(PartitionedParams),
}

impl GraphShape {
    /// Short family name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Clique { .. } => "clique",
            Self::CliquesGraph(_) => "cliques-graph",
            Self::KPartite(_) => "k-partite",
        }
    }

    /// Upper bound on the number of vertices a run can produce.
    #[must_use]
    pub const fn max_vertices(&self) -> u64 {
        match self {
            Self::Clique { size, .. } => *size,
            Self::CliquesGraph(params) | Self::KPartite(params) => {
                params.count.saturating_mul(params.max_size)
            }
        }
    }

    /// Whether vertices and edge endpoints carry partition labels.
    #[must_use]
    pub const fn tracks_partitions(&self) -> bool {
        !matches!(self, Self::Clique { .. })
    }

    /// Omission probability of edges inside a partition, or `None` when the
    /// family has no intra-partition edges.
    #[must_use]
    pub const fn intra_prob_missing(&self) -> Option<f64> {
        match self {
            Self::Clique { prob_missing, .. } => Some(*prob_missing),
            Self::CliquesGraph(params) => Some(params.prob_missing_one),
            Self::KPartite(_) => None,
        }
    }

    /// Omission probabilities `(pair, edge)` between partitions, or `None`
    /// for the single clique.
    #[must_use]
    pub const fn inter_prob_missing(&self) -> Option<(f64, f64)> {
        match self {
            Self::Clique { .. } => None,
            Self::CliquesGraph(params) => {
                Some((params.prob_missing_all, params.prob_missing_one_between))
            }
            Self::KPartite(params) => Some((0.0, params.prob_missing_one_between)),
        }
    }

    /// Checks sizes and probabilities.
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidSizeRange`] or
    /// [`GeneratorError::InvalidProbability`].
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Clique { prob_missing, .. } => check_probability("prob_missing", *prob_missing),
            Self::CliquesGraph(params) => params.validate("cliques"),
            Self::KPartite(params) => params.validate("parts"),
        }
    }
}

impl fmt::Display for GraphShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clique { size, .. } => write!(f, "clique of {size} vertices"),
            Self::CliquesGraph(params) | Self::KPartite(params) => write!(
                f,
                "{} with {} partitions of {}..={} vertices",
                self.kind(),
                params.count,
                params.min_size,
                params.max_size
            ),
        }
    }
}

/// Checks that `value` is a finite probability in `[0, 1]`.
///
/// # Errors
/// Returns [`GeneratorError::InvalidProbability`] otherwise.
pub(crate) fn check_probability(parameter: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GeneratorError::InvalidProbability { parameter, value })
    }
}
