//! JSON-lines bulk sink writing database-ready vertex and edge documents.

mod errors;
mod naming;
mod records;
mod sink;

pub use errors::{JsonLinesError, NamingError};
pub use naming::{DocumentNaming, SmartKeys};
pub use sink::JsonLinesSink;
