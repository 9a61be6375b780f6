//! Core contracts for Fakeset.
//!
//! This crate defines the schema and dataset records shared by the generator,
//! the job layer and the CLI, plus the structural validation applied before a
//! schema is used for generation.

pub mod dataset;
pub mod document;
pub mod error;
pub mod ids;
pub mod schema;
pub mod types;
pub mod validation;

pub use dataset::{Dataset, DatasetStatus, OutputLocation};
pub use document::{ColumnSpec, SchemaDocument, document_json_schema, parse_schema_document};
pub use error::{Error, Result};
pub use ids::{DatasetId, SchemaId};
pub use schema::{Column, SchemaDefinition};
pub use types::{ColumnSeparator, ColumnType, QuoteCharacter, ValueRange};
pub use validation::{MAX_TEXT_SENTENCES, validate_schema};
