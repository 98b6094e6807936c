//! Collection, attribute and key naming of emitted documents.

use cliquegen_core::{VertexId, VertexRef};

use crate::errors::NamingError;

/// Attribute names that generated documents already use.
const RESERVED_VERTEX_ATTRIBUTES: [&str; 2] = ["part", "id"];

/// How document keys are formed for sharded ("smart") graphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmartKeys {
    /// Keys are `"{id}:{id}"` and `attribute` carries the id as a string.
    ById {
        /// Name of the sharding attribute.
        attribute: String,
    },
    /// Keys are `"{part}:{id}"`, sharding by the partition label.
    ByPart,
}

/// Names used when rendering documents.
///
/// # Examples
/// ```
/// use cliquegen_sinks_jsonl::{DocumentNaming, NamingError};
///
/// let naming = DocumentNaming::default();
/// assert_eq!(naming.vertex_collection, "v");
/// assert!(naming.validate().is_ok());
///
/// let reserved = DocumentNaming { vertex_attribute: "part".into(), ..DocumentNaming::default() };
/// assert!(matches!(reserved.validate(), Err(NamingError::ReservedAttribute { .. })));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNaming {
    /// Vertex collection; also the prefix of edge endpoints.
    pub vertex_collection: String,
    /// Edge collection.
    pub edge_collection: String,
    /// Attribute holding the vertex property.
    pub vertex_attribute: String,
    /// Attribute holding the edge property.
    pub edge_attribute: String,
    /// Smart-graph key scheme, if any.
    pub smart: Option<SmartKeys>,
}

impl Default for DocumentNaming {
    fn default() -> Self {
        Self {
            vertex_collection: "v".to_owned(),
            edge_collection: "e".to_owned(),
            vertex_attribute: "color".to_owned(),
            edge_attribute: "weight".to_owned(),
            smart: None,
        }
    }
}

impl DocumentNaming {
    /// Checks the names for emptiness and collisions.
    ///
    /// A [`SmartKeys::ById`] attribute may never equal `vertex_attribute`,
    /// whether or not vertices carry a property: both are written to the same
    /// document, so a shared name would yield a duplicate JSON key.
    ///
    /// # Errors
    /// Returns the first [`NamingError`] found.
    ///
    /// # Examples
    /// ```
    /// use cliquegen_sinks_jsonl::{DocumentNaming, NamingError, SmartKeys};
    ///
    /// let clash = DocumentNaming {
    ///     smart: Some(SmartKeys::ById { attribute: "color".into() }),
    ///     ..DocumentNaming::default()
    /// };
    /// assert!(matches!(clash.validate(), Err(NamingError::SmartAttributeClash { .. })));
    /// ```
    pub fn validate(&self) -> Result<(), NamingError> {
        if self.vertex_collection.is_empty() {
            return Err(NamingError::EmptyCollection { role: "vertex" });
        }
        if self.edge_collection.is_empty() {
            return Err(NamingError::EmptyCollection { role: "edge" });
        }
        if RESERVED_VERTEX_ATTRIBUTES.contains(&self.vertex_attribute.as_str()) {
            return Err(NamingError::ReservedAttribute {
                attribute: self.vertex_attribute.clone(),
            });
        }
        match &self.smart {
            Some(SmartKeys::ById { attribute }) if attribute.is_empty() => {
                Err(NamingError::EmptySmartAttribute)
            }
            Some(SmartKeys::ById { attribute }) if *attribute == self.vertex_attribute => {
                Err(NamingError::SmartAttributeClash {
                    attribute: attribute.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Key of vertex `id` labelled with `part`.
    ///
    /// # Examples
    /// ```
    /// use cliquegen_sinks_jsonl::{DocumentNaming, SmartKeys};
    ///
    /// let plain = DocumentNaming::default();
    /// assert_eq!(plain.key(7, Some(5)), "7");
    ///
    /// let by_part = DocumentNaming { smart: Some(SmartKeys::ByPart), ..DocumentNaming::default() };
    /// assert_eq!(by_part.key(7, Some(5)), "5:7");
    /// assert_eq!(by_part.key(7, None), "7:7");
    /// ```
    #[must_use]
    pub fn key(&self, id: VertexId, part: Option<VertexId>) -> String {
        match (&self.smart, part) {
            (None, _) => id.to_string(),
            (Some(SmartKeys::ByPart), Some(part)) => format!("{part}:{id}"),
            (Some(_), _) => format!("{id}:{id}"),
        }
    }

    /// Document handle of an edge endpoint, `"{vertex_collection}/{key}"`.
    #[must_use]
    pub fn handle(&self, vertex: VertexRef) -> String {
        format!(
            "{}/{}",
            self.vertex_collection,
            self.key(vertex.id, vertex.part)
        )
    }

    /// File name of the vertex collection.
    #[must_use]
    pub fn vertex_file(&self) -> String {
        format!("{}.jsonl", self.vertex_collection)
    }

    /// File name of the edge collection.
    #[must_use]
    pub fn edge_file(&self) -> String {
        format!("{}.jsonl", self.edge_collection)
    }
}
