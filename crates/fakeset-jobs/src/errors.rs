use std::time::Duration;

use thiserror::Error;

use fakeset_generate::GenerationError;

/// Errors raised by a dataset record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store task failed: {0}")]
    Task(String),
}

/// Errors raised by a storage sink.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid object name: {0}")]
    InvalidName(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage task failed: {0}")]
    Task(String),
}

/// Rejections from [`crate::JobDispatcher::schedule`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("job queue is full")]
    Full,
    #[error("job queue is closed")]
    Closed,
}

/// Outcome of a failed dataset job.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("unknown column type: {0}")]
    UnknownColumnType(String),
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    #[error("generation io error: {0}")]
    GenerationIo(std::io::Error),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("persistence error: {0}")]
    Persistence(StoreError),
    #[error("job timed out after {0:?}")]
    Timeout(Duration),
    #[error("generation task failed: {0}")]
    Join(String),
}

impl From<StoreError> for JobError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => JobError::NotFound { kind, id },
            other => JobError::Persistence(other),
        }
    }
}

impl From<GenerationError> for JobError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::UnknownColumnType(tag) => JobError::UnknownColumnType(tag),
            GenerationError::InvalidSchema(message) => JobError::InvalidSchema(message),
            GenerationError::Io(err) => JobError::GenerationIo(err),
        }
    }
}

impl JobError {
    /// Short machine-readable label used in logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::NotFound { .. } => "not_found",
            JobError::UnknownColumnType(_) => "unknown_column_type",
            JobError::InvalidSchema(_) => "invalid_schema",
            JobError::GenerationIo(_) => "generation_io",
            JobError::Storage(_) => "storage",
            JobError::Persistence(_) => "persistence",
            JobError::Timeout(_) => "timeout",
            JobError::Join(_) => "join",
        }
    }
}
