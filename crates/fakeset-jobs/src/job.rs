use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use fakeset_core::{Dataset, DatasetId, DatasetStatus, OutputLocation, SchemaId};
use fakeset_generate::GenerationEngine;

use crate::config::{JobConfig, RerunPolicy};
use crate::errors::JobError;
use crate::naming::output_name;
use crate::storage::StorageSink;
use crate::store::DatasetStore;

/// Summary of one successful job run.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub dataset_id: DatasetId,
    pub schema_id: SchemaId,
    pub status: DatasetStatus,
    pub rows: u64,
    pub output: Option<OutputLocation>,
    /// The dataset was already ready and left untouched.
    pub skipped: bool,
    pub duration_ms: u64,
}

/// Turns a `Processing` dataset into a generated file and a `Ready` record.
///
/// Output bytes are produced in full before the sink sees them, so a failed
/// run never leaves a partial file behind and never changes the output
/// reference of the dataset.
#[derive(Clone)]
pub struct DatasetJob {
    store: Arc<dyn DatasetStore>,
    storage: Arc<dyn StorageSink>,
    engine: GenerationEngine,
    config: JobConfig,
    timeout: Duration,
    seed: Option<u64>,
}

impl DatasetJob {
    pub fn new(
        store: Arc<dyn DatasetStore>,
        storage: Arc<dyn StorageSink>,
        config: JobConfig,
    ) -> Self {
        let timeout = config.job_timeout();
        Self {
            store,
            storage,
            engine: GenerationEngine::default(),
            config,
            timeout,
            seed: None,
        }
    }

    pub fn with_engine(mut self, engine: GenerationEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Draw every run from a generator seeded with `seed` instead of the
    /// thread-local entropy source.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Generate the dataset `dataset_id` and mark it ready.
    ///
    /// A missing dataset record is reported without touching the store. Any
    /// later failure leaves the output reference untouched; with
    /// `record_failures` on, a dataset that was not ready moves to `Failed`.
    pub async fn run(&self, dataset_id: DatasetId) -> Result<JobReport, JobError> {
        let start = Instant::now();
        let mut dataset = self.store.load_dataset(dataset_id).await.inspect_err(|err| {
            warn!(dataset_id = %dataset_id, error = %err, "dataset job rejected");
        })?;

        if dataset.is_ready() && self.config.rerun_policy == RerunPolicy::SkipReady {
            debug!(dataset_id = %dataset_id, "dataset already ready; skipping");
            return Ok(report(&dataset, true, start));
        }

        info!(
            dataset_id = %dataset_id,
            schema_id = %dataset.schema_id,
            rows = dataset.row_count,
            "dataset job started"
        );

        let outcome = match tokio::time::timeout(self.timeout, self.produce(&dataset)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(JobError::Timeout(self.timeout)),
        };
        let outcome = match outcome {
            Ok(output) => self.commit(&mut dataset, output).await,
            Err(err) => Err(err),
        };

        match outcome {
            Ok(()) => {
                let report = report(&dataset, false, start);
                info!(
                    dataset_id = %dataset_id,
                    rows = report.rows,
                    bytes = report.output.as_ref().map(|output| output.bytes).unwrap_or(0),
                    duration_ms = report.duration_ms,
                    "dataset job completed"
                );
                Ok(report)
            }
            Err(err) => {
                warn!(
                    dataset_id = %dataset_id,
                    kind = err.kind(),
                    error = %err,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "dataset job failed"
                );
                if self.config.record_failures {
                    self.record_failure(&mut dataset, &err).await;
                }
                Err(err)
            }
        }
    }

    /// Generate the dataset and hand its bytes to the sink.
    async fn produce(&self, dataset: &Dataset) -> Result<OutputLocation, JobError> {
        let schema = self.store.load_schema(dataset.schema_id).await?;
        let name = output_name(&schema, dataset, self.config.output_naming);

        let engine = self.engine.clone();
        let rows = dataset.row_count;
        let seed = self.seed;
        let (bytes, summary) = tokio::task::spawn_blocking(move || {
            let rng = match seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_rng(&mut rand::rng()),
            };
            engine.generate_to_vec(&schema, rows, rng)
        })
        .await
        .map_err(|err| JobError::Join(err.to_string()))??;

        let uri = self.storage.write_file(&name, bytes).await?;
        Ok(OutputLocation {
            name,
            uri,
            bytes: summary.bytes,
            sha256: summary.sha256,
        })
    }

    /// Persist the ready transition. Runs outside the job timeout so a save
    /// in flight is never raced by a failure record.
    async fn commit(&self, dataset: &mut Dataset, output: OutputLocation) -> Result<(), JobError> {
        let mut updated = dataset.clone();
        updated.mark_ready(output, Utc::now());
        self.store
            .save_dataset(&updated)
            .await
            .map_err(JobError::Persistence)?;
        *dataset = updated;
        Ok(())
    }

    async fn record_failure(&self, dataset: &mut Dataset, err: &JobError) {
        if dataset.mark_failed(err.to_string(), Utc::now()).is_err() {
            debug!(dataset_id = %dataset.id, "ready dataset keeps its previous output");
            return;
        }
        if let Err(save_err) = self.store.save_dataset(dataset).await {
            warn!(
                dataset_id = %dataset.id,
                error = %save_err,
                "failed to record dataset failure"
            );
        }
    }
}

fn report(dataset: &Dataset, skipped: bool, start: Instant) -> JobReport {
    JobReport {
        dataset_id: dataset.id,
        schema_id: dataset.schema_id,
        status: dataset.status(),
        rows: dataset.row_count,
        output: dataset.output().cloned(),
        skipped,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}
