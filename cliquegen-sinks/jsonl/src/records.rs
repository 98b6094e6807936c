//! Serialisation of generated documents into collection records.
//!
//! Property values are written as strings.

use cliquegen_core::{EdgeDocument, VertexDocument};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::naming::{DocumentNaming, SmartKeys};

/// A vertex rendered with its collection naming.
pub(crate) struct VertexRecord<'a> {
    pub(crate) naming: &'a DocumentNaming,
    pub(crate) document: &'a VertexDocument,
}

/// An edge rendered with its collection naming.
pub(crate) struct EdgeRecord<'a> {
    pub(crate) naming: &'a DocumentNaming,
    pub(crate) document: &'a EdgeDocument,
}

impl Serialize for VertexRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let VertexDocument { id, part, property } = self.document;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("_key", &self.naming.key(*id, *part))?;
        if let Some(part) = part {
            map.serialize_entry("part", &part.to_string())?;
        }
        if let Some(SmartKeys::ById { attribute }) = &self.naming.smart {
            map.serialize_entry(attribute, &id.to_string())?;
        }
        if let Some(value) = property {
            map.serialize_entry(&self.naming.vertex_attribute, &value.to_string())?;
        }
        map.end()
    }
}

impl Serialize for EdgeRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("_from", &self.naming.handle(self.document.from))?;
        map.serialize_entry("_to", &self.naming.handle(self.document.to))?;
        if let Some(value) = &self.document.property {
            map.serialize_entry(&self.naming.edge_attribute, &value.to_string())?;
        }
        map.end()
    }
}
