//! Vertex and edge documents emitted by the generator.

use std::fmt;

/// Identifier of a generated vertex.
pub type VertexId = u64;

/// Scalar value attached to a vertex or edge.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    /// Value drawn uniformly from a random range.
    Number(f64),
    /// Value taken verbatim from an explicit list.
    Text(String),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// A single vertex document.
///
/// `part` carries the starting id of the vertex's partition when partition
/// tracking is active for the run.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexDocument {
    /// Globally unique vertex id.
    pub id: VertexId,
    /// Partition label, equal to the first id of the partition.
    pub part: Option<VertexId>,
    /// Optional property value.
    pub property: Option<PropertyValue>,
}

/// Reference to an edge endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexRef {
    /// Referenced vertex id.
    pub id: VertexId,
    /// Partition label of the referenced vertex, when tracked.
    pub part: Option<VertexId>,
}

impl VertexRef {
    /// Creates a reference without a partition label.
    ///
    /// # Examples
    /// ```
    /// use cliquegen_core::VertexRef;
    ///
    /// let vertex = VertexRef::plain(7);
    /// assert_eq!(vertex.id, 7);
    /// assert!(vertex.part.is_none());
    /// ```
    #[must_use]
    pub const fn plain(id: VertexId) -> Self {
        Self { id, part: None }
    }

    /// Creates a reference carrying the given partition label.
    #[must_use]
    pub const fn in_part(id: VertexId, part: Option<VertexId>) -> Self {
        Self { id, part }
    }
}

/// A single directed edge document.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeDocument {
    /// Source endpoint.
    pub from: VertexRef,
    /// Target endpoint.
    pub to: VertexRef,
    /// Optional property value.
    pub property: Option<PropertyValue>,
}

impl EdgeDocument {
    /// Returns the `(from, to)` id pair.
    #[must_use]
    pub const fn endpoints(&self) -> (VertexId, VertexId) {
        (self.from.id, self.to.id)
    }
}
