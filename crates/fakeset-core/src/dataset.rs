use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ids::{DatasetId, SchemaId};

/// Lifecycle status of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum DatasetStatus {
    Processing,
    Ready,
    Failed,
}

impl DatasetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::Ready => "Ready",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for DatasetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the generated bytes of a dataset live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OutputLocation {
    /// Name the file was stored under.
    pub name: String,
    /// Storage-specific reference (a path for filesystem storage).
    pub uri: String,
    pub bytes: u64,
    /// Hex-encoded SHA-256 of the stored bytes.
    pub sha256: String,
}

/// One generation request against a schema.
///
/// `output` is present exactly when the status is `Ready`, and `error` exactly
/// when it is `Failed`. Both are only changed through [`Dataset::mark_ready`]
/// and [`Dataset::mark_failed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Dataset {
    pub id: DatasetId,
    pub schema_id: SchemaId,
    pub row_count: u64,
    status: DatasetStatus,
    #[serde(default)]
    output: Option<OutputLocation>,
    #[serde(default)]
    error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Dataset {
    /// A fresh dataset in `Processing` with no output.
    pub fn new(schema_id: SchemaId, row_count: u64) -> Self {
        Self {
            id: DatasetId::new(),
            schema_id,
            row_count,
            status: DatasetStatus::Processing,
            output: None,
            error: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn status(&self) -> DatasetStatus {
        self.status
    }

    pub fn output(&self) -> Option<&OutputLocation> {
        self.output.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.status == DatasetStatus::Ready
    }

    /// Record a completed generation. Valid from every state: a `Ready`
    /// dataset that is processed again gets its output replaced.
    pub fn mark_ready(&mut self, output: OutputLocation, at: DateTime<Utc>) {
        self.status = DatasetStatus::Ready;
        self.output = Some(output);
        self.error = None;
        self.finished_at = Some(at);
    }

    /// Record a failed generation. A `Ready` dataset keeps its previous output.
    pub fn mark_failed(&mut self, error: impl Into<String>, at: DateTime<Utc>) -> Result<()> {
        if self.status == DatasetStatus::Ready {
            return Err(Error::InvalidTransition {
                from: self.status.as_str(),
                to: DatasetStatus::Failed.as_str(),
            });
        }
        self.status = DatasetStatus::Failed;
        self.output = None;
        self.error = Some(error.into());
        self.finished_at = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> OutputLocation {
        OutputLocation {
            name: "out.csv".to_string(),
            uri: "/tmp/out.csv".to_string(),
            bytes: 12,
            sha256: "00".to_string(),
        }
    }

    #[test]
    fn new_dataset_is_processing_without_output() {
        let dataset = Dataset::new(SchemaId::new(), 10);
        assert_eq!(dataset.status(), DatasetStatus::Processing);
        assert!(dataset.output().is_none());
        assert!(dataset.error().is_none());
        assert!(dataset.finished_at.is_none());
    }

    #[test]
    fn ready_sets_output() {
        let mut dataset = Dataset::new(SchemaId::new(), 1);
        dataset.mark_ready(location(), Utc::now());
        assert!(dataset.is_ready());
        assert_eq!(dataset.output(), Some(&location()));
    }

    #[test]
    fn failed_can_be_retried_into_ready() {
        let mut dataset = Dataset::new(SchemaId::new(), 1);
        dataset.mark_failed("boom", Utc::now()).expect("fail processing dataset");
        assert_eq!(dataset.status(), DatasetStatus::Failed);
        assert_eq!(dataset.error(), Some("boom"));
        assert!(dataset.output().is_none());

        dataset.mark_ready(location(), Utc::now());
        assert!(dataset.is_ready());
        assert!(dataset.error().is_none());
    }

    #[test]
    fn ready_dataset_cannot_fail() {
        let mut dataset = Dataset::new(SchemaId::new(), 1);
        dataset.mark_ready(location(), Utc::now());
        let result = dataset.mark_failed("late", Utc::now());
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
        assert!(dataset.output().is_some());
    }
}
