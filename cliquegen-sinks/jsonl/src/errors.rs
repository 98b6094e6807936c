//! Error types for the JSON-lines sink.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Invalid collection or attribute names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    /// A collection name was empty.
    #[error("{role} collection name must not be empty")]
    EmptyCollection {
        /// `"vertex"` or `"edge"`.
        role: &'static str,
    },
    /// The vertex attribute shadows a field the documents already carry.
    #[error("vertex attribute cannot be `{attribute}`, choose another name")]
    ReservedAttribute {
        /// Rejected attribute name.
        attribute: String,
    },
    /// The smart attribute would overwrite the vertex property.
    #[error("smart attribute `{attribute}` collides with the vertex attribute")]
    SmartAttributeClash {
        /// Rejected attribute name.
        attribute: String,
    },
    /// Smart keys by id were requested without an attribute name.
    #[error("smart attribute must not be empty")]
    EmptySmartAttribute,
}

/// Failure to set up a [`crate::JsonLinesSink`].
#[derive(Debug, Error)]
pub enum JsonLinesError {
    /// The naming did not validate.
    #[error(transparent)]
    Naming(#[from] NamingError),
    /// The output directory or a collection file could not be created.
    #[error("failed to prepare `{}`: {source}", path.display())]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
}
