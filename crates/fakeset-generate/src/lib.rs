//! Synthetic row generation for Fakeset.
//!
//! This crate turns a [`fakeset_core::SchemaDefinition`] into a lazily
//! produced sequence of delimited text lines, using the `fake` crate for
//! realistic values and an explicit randomness source for every draw.

pub mod engine;
pub mod errors;
pub mod generators;
pub mod model;
pub mod output;
pub mod rows;

pub use engine::GenerationEngine;
pub use errors::GenerationError;
pub use generators::{GeneratedValue, GeneratorRegistry};
pub use model::SinkSummary;
pub use rows::RowProducer;
