use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::naming::OutputNaming;

/// What a job does when its dataset is already `ready`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerunPolicy {
    /// Generate again and replace the output reference.
    #[default]
    Regenerate,
    /// Leave the dataset untouched and report success.
    SkipReady,
}

/// Tunables for dataset jobs and the worker that runs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Jobs allowed to run at the same time.
    pub max_concurrent_jobs: usize,
    /// Pending jobs the queue holds before `schedule` reports it full.
    pub queue_capacity: usize,
    /// Wall-clock limit for one job, in seconds.
    pub job_timeout_secs: u64,
    /// Move a dataset to `failed` when its job fails. When off, a failed
    /// dataset stays `processing`.
    pub record_failures: bool,
    pub rerun_policy: RerunPolicy,
    pub output_naming: OutputNaming,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 4,
            queue_capacity: 64,
            job_timeout_secs: 600,
            record_failures: true,
            rerun_policy: RerunPolicy::default(),
            output_naming: OutputNaming::default(),
        }
    }
}

impl JobConfig {
    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    /// Concurrency limit, never below one.
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_jobs.max(1)
    }

    /// Queue capacity, never below one.
    pub fn capacity(&self) -> usize {
        self.queue_capacity.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: JobConfig =
            serde_json::from_str(r#"{"max_concurrent_jobs": 2, "rerun_policy": "skip_ready"}"#)
                .expect("parse");
        assert_eq!(config.max_concurrent_jobs, 2);
        assert_eq!(config.rerun_policy, RerunPolicy::SkipReady);
        assert_eq!(config.queue_capacity, 64);
        assert!(config.record_failures);
        assert_eq!(config.output_naming, OutputNaming::Unique);
    }

    #[test]
    fn zero_limits_are_clamped() {
        let config = JobConfig {
            max_concurrent_jobs: 0,
            queue_capacity: 0,
            ..JobConfig::default()
        };
        assert_eq!(config.concurrency(), 1);
        assert_eq!(config.capacity(), 1);
    }
}
