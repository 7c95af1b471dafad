//! Pattern extractors for document markup
//!
//! Documents embed a templating language whose expressions this module
//! pulls out as plain strings: dollar-prefixed call expressions, references
//! to other library modules, and table lookups inside those expressions.
//! Extraction is purely textual and never touches the network.

mod queries;
mod references;
mod tables;

pub use queries::extract_queries;
pub use references::{CONTENT_LIBRARY_MARKER, extract_module_references, resolve_module_path};
pub use tables::{TableReference, extract_table_references};
