use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use fakeset_core::{Dataset, DatasetId, SchemaDefinition, SchemaId};

use crate::atomic::write_json_atomic;
use crate::errors::StoreError;

/// Persistent home of schema and dataset records.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    async fn load_schema(&self, id: SchemaId) -> Result<SchemaDefinition, StoreError>;
    async fn save_schema(&self, schema: &SchemaDefinition) -> Result<(), StoreError>;
    async fn load_dataset(&self, id: DatasetId) -> Result<Dataset, StoreError>;
    async fn save_dataset(&self, dataset: &Dataset) -> Result<(), StoreError>;
}

/// Store backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    schemas: RwLock<HashMap<SchemaId, SchemaDefinition>>,
    datasets: RwLock<HashMap<DatasetId, Dataset>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatasetStore for InMemoryStore {
    async fn load_schema(&self, id: SchemaId) -> Result<SchemaDefinition, StoreError> {
        self.schemas
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("schema", id))
    }

    async fn save_schema(&self, schema: &SchemaDefinition) -> Result<(), StoreError> {
        self.schemas.write().await.insert(schema.id, schema.clone());
        Ok(())
    }

    async fn load_dataset(&self, id: DatasetId) -> Result<Dataset, StoreError> {
        self.datasets
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("dataset", id))
    }

    async fn save_dataset(&self, dataset: &Dataset) -> Result<(), StoreError> {
        self.datasets
            .write()
            .await
            .insert(dataset.id, dataset.clone());
        Ok(())
    }
}

/// Store keeping one pretty JSON file per record:
/// `<root>/schemas/<id>.json` and `<root>/datasets/<id>.json`.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn schema_path(&self, id: SchemaId) -> PathBuf {
        self.root.join("schemas").join(format!("{id}.json"))
    }

    pub fn dataset_path(&self, id: DatasetId) -> PathBuf {
        self.root.join("datasets").join(format!("{id}.json"))
    }
}

#[async_trait]
impl DatasetStore for FsStore {
    async fn load_schema(&self, id: SchemaId) -> Result<SchemaDefinition, StoreError> {
        read_record(&self.schema_path(id), "schema", id).await
    }

    async fn save_schema(&self, schema: &SchemaDefinition) -> Result<(), StoreError> {
        write_record(self.schema_path(schema.id), schema.clone()).await
    }

    async fn load_dataset(&self, id: DatasetId) -> Result<Dataset, StoreError> {
        read_record(&self.dataset_path(id), "dataset", id).await
    }

    async fn save_dataset(&self, dataset: &Dataset) -> Result<(), StoreError> {
        write_record(self.dataset_path(dataset.id), dataset.clone()).await
    }
}

async fn read_record<T, I>(path: &Path, kind: &'static str, id: I) -> Result<T, StoreError>
where
    T: serde::de::DeserializeOwned,
    I: std::fmt::Display,
{
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(not_found(kind, id));
        }
        Err(err) => return Err(err.into()),
    };
    Ok(serde_json::from_slice(&bytes)?)
}

async fn write_record<T>(path: PathBuf, value: T) -> Result<(), StoreError>
where
    T: serde::Serialize + Send + 'static,
{
    tokio::task::spawn_blocking(move || write_json_atomic(&path, &value))
        .await
        .map_err(|err| StoreError::Task(err.to_string()))??;
    Ok(())
}

fn not_found(kind: &'static str, id: impl std::fmt::Display) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}
