//! Declarative extraction
//!
//! This module contains:
//! - The schema data model (`Schema`, `ExtractionNode`, `PreHook`)
//! - Field values and the transform pipeline
//! - The interpreter that evaluates a schema against a browser session
//! - The built-in schema for document detail pages

mod document;
mod interpreter;
mod schema;
mod transform;
mod value;

// Re-export main types
pub use document::document_schema;
pub use interpreter::{Interpreter, Timeouts};
pub use schema::{ExtractionNode, Multiplicity, PreHook, Schema, SchemaError};
pub use transform::{apply_all, Transform, TransformError, TransformResult};
pub use value::FieldValue;
