use std::path::Path;
use std::time::Instant;

use rand::RngCore;
use tracing::{info, warn};

use fakeset_core::{SchemaDefinition, validate_schema};

use crate::errors::GenerationError;
use crate::generators::GeneratorRegistry;
use crate::model::SinkSummary;
use crate::output::csv::write_dataset_file;
use crate::rows::RowProducer;

/// Entry point for generating delimited text from a schema.
#[derive(Debug, Clone, Default)]
pub struct GenerationEngine {
    registry: GeneratorRegistry,
}

impl GenerationEngine {
    pub fn new(registry: GeneratorRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// Validate `schema` and return a lazy producer for `rows` data lines.
    pub fn producer<'a, R: RngCore>(
        &'a self,
        schema: &'a SchemaDefinition,
        rows: u64,
        rng: R,
    ) -> Result<RowProducer<'a, R>, GenerationError> {
        validate_schema(schema)?;
        RowProducer::new(schema, rows, &self.registry, rng)
    }

    /// Generate the whole dataset into a buffer.
    pub fn generate_to_vec<R: RngCore>(
        &self,
        schema: &SchemaDefinition,
        rows: u64,
        rng: R,
    ) -> Result<(Vec<u8>, SinkSummary), GenerationError> {
        let start = Instant::now();
        let producer = self.producer(schema, rows, rng)?;
        let mut buffer = Vec::new();
        let summary = producer.write_to(&mut buffer).inspect_err(|err| {
            warn!(schema_id = %schema.id, error = %err, "generation failed");
        })?;
        log_completed(schema, &summary, start);
        Ok((buffer, summary))
    }

    /// Generate the whole dataset into `path`, replacing it atomically.
    pub fn generate_to_file<R: RngCore>(
        &self,
        schema: &SchemaDefinition,
        rows: u64,
        path: &Path,
        rng: R,
    ) -> Result<SinkSummary, GenerationError> {
        let start = Instant::now();
        let producer = self.producer(schema, rows, rng)?;
        info!(
            schema_id = %schema.id,
            rows,
            path = %path.display(),
            "generation started"
        );
        let summary = write_dataset_file(path, producer).inspect_err(|err| {
            warn!(schema_id = %schema.id, error = %err, "generation failed");
        })?;
        log_completed(schema, &summary, start);
        Ok(summary)
    }
}

fn log_completed(schema: &SchemaDefinition, summary: &SinkSummary, start: Instant) {
    info!(
        schema_id = %schema.id,
        rows = summary.rows(),
        bytes = summary.bytes,
        duration_ms = start.elapsed().as_millis() as u64,
        "generation completed"
    );
}
