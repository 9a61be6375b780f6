use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, Semaphore, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use fakeset_core::DatasetId;

use crate::errors::{JobError, QueueError};
use crate::job::{DatasetJob, JobReport};

/// Accepts dataset ids for asynchronous processing.
///
/// `schedule` returns as soon as the job is queued; it never waits for the
/// job to run.
pub trait JobDispatcher: Send + Sync {
    fn schedule(&self, dataset_id: DatasetId) -> Result<(), QueueError>;
}

/// One queued job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTask {
    pub dataset_id: DatasetId,
    pub enqueued_at: DateTime<Utc>,
}

impl JobTask {
    pub fn new(dataset_id: DatasetId) -> Self {
        Self {
            dataset_id,
            enqueued_at: Utc::now(),
        }
    }
}

/// Dispatcher feeding a bounded in-process queue.
#[derive(Debug, Clone)]
pub struct QueueDispatcher {
    sender: mpsc::Sender<JobTask>,
}

impl JobDispatcher for QueueDispatcher {
    fn schedule(&self, dataset_id: DatasetId) -> Result<(), QueueError> {
        self.sender
            .try_send(JobTask::new(dataset_id))
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => QueueError::Full,
                mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
            })?;
        debug!(dataset_id = %dataset_id, "dataset job queued");
        Ok(())
    }
}

/// Counters kept by a [`JobWorker`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerMetrics {
    pub jobs_started: u64,
    pub jobs_completed: u64,
    pub jobs_skipped: u64,
    pub jobs_failed: u64,
}

/// Runs queued dataset jobs in the background, at most
/// `max_concurrent_jobs` at a time.
pub struct JobWorker {
    job: Arc<DatasetJob>,
    concurrency: usize,
    sender: Option<mpsc::Sender<JobTask>>,
    receiver: Option<mpsc::Receiver<JobTask>>,
    cancellation_token: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
    metrics: Arc<RwLock<WorkerMetrics>>,
    stop_timeout: Duration,
}

impl JobWorker {
    pub fn new(job: DatasetJob) -> Self {
        let config = job.config().clone();
        let (sender, receiver) = mpsc::channel(config.capacity());
        Self {
            job: Arc::new(job),
            concurrency: config.concurrency(),
            sender: Some(sender),
            receiver: Some(receiver),
            cancellation_token: CancellationToken::new(),
            task_handle: None,
            metrics: Arc::new(RwLock::new(WorkerMetrics::default())),
            stop_timeout: config.job_timeout() + Duration::from_secs(5),
        }
    }

    /// A dispatcher feeding this worker's queue, or `None` once the worker
    /// has begun draining.
    pub fn dispatcher(&self) -> Option<QueueDispatcher> {
        self.sender.as_ref().map(|sender| QueueDispatcher {
            sender: sender.clone(),
        })
    }

    /// Spawn the processing loop. Calling it twice is a no-op.
    pub fn start(&mut self) {
        let Some(receiver) = self.receiver.take() else {
            warn!("job worker already started");
            return;
        };

        info!(concurrency = self.concurrency, "starting job worker");
        let job = Arc::clone(&self.job);
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let metrics = Arc::clone(&self.metrics);
        let cancellation_token = self.cancellation_token.clone();

        self.task_handle = Some(tokio::spawn(async move {
            processing_loop(receiver, job, semaphore, metrics, cancellation_token).await;
        }));
    }

    /// Stop taking new jobs once every dispatcher is dropped and the queue is
    /// empty, then wait for in-flight jobs. There is no overall deadline:
    /// each job is bounded by its own timeout.
    pub async fn drain(&mut self) {
        self.sender = None;
        self.join("drained", None).await;
    }

    /// Stop taking jobs now and wait, up to the job timeout plus a grace
    /// period, for in-flight jobs. Queued jobs that have not started are
    /// dropped.
    pub async fn shutdown(&mut self) {
        self.sender = None;
        self.cancellation_token.cancel();
        self.join("stopped", Some(self.stop_timeout)).await;
    }

    pub async fn metrics(&self) -> WorkerMetrics {
        self.metrics.read().await.clone()
    }

    async fn join(&mut self, outcome: &'static str, deadline: Option<Duration>) {
        let Some(handle) = self.task_handle.take() else {
            return;
        };
        let joined = match deadline {
            Some(deadline) => match tokio::time::timeout(deadline, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(outcome, "job worker did not finish within timeout");
                    return;
                }
            },
            None => handle.await,
        };
        match joined {
            Ok(()) => info!(outcome, "job worker finished"),
            Err(err) => error!(error = %err, "job worker task panicked"),
        }
    }
}

impl Drop for JobWorker {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}

async fn processing_loop(
    mut receiver: mpsc::Receiver<JobTask>,
    job: Arc<DatasetJob>,
    semaphore: Arc<Semaphore>,
    metrics: Arc<RwLock<WorkerMetrics>>,
    cancellation_token: CancellationToken,
) {
    let mut in_flight = JoinSet::new();

    loop {
        let permit = tokio::select! {
            _ = cancellation_token.cancelled() => break,
            permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };
        let task = tokio::select! {
            _ = cancellation_token.cancelled() => break,
            task = receiver.recv() => match task {
                Some(task) => task,
                None => break,
            },
        };

        metrics.write().await.jobs_started += 1;
        let job = Arc::clone(&job);
        let metrics = Arc::clone(&metrics);
        in_flight.spawn(async move {
            let _permit = permit;
            let result = job.run(task.dataset_id).await;
            record(&metrics, &task, &result).await;
        });

        while let Some(joined) = in_flight.try_join_next() {
            if let Err(err) = joined {
                error!(error = %err, "dataset job task panicked");
            }
        }
    }

    receiver.close();
    let abandoned = std::iter::from_fn(|| receiver.try_recv().ok()).count();
    if abandoned > 0 {
        warn!(abandoned, "queued dataset jobs dropped at shutdown");
    }

    while let Some(joined) = in_flight.join_next().await {
        if let Err(err) = joined {
            error!(error = %err, "dataset job task panicked");
        }
    }
}

async fn record(
    metrics: &RwLock<WorkerMetrics>,
    task: &JobTask,
    result: &Result<JobReport, JobError>,
) {
    let mut metrics = metrics.write().await;
    match result {
        Ok(report) if report.skipped => metrics.jobs_skipped += 1,
        Ok(_) => metrics.jobs_completed += 1,
        Err(err) => {
            metrics.jobs_failed += 1;
            debug!(
                dataset_id = %task.dataset_id,
                since_enqueued_ms = (Utc::now() - task.enqueued_at).num_milliseconds(),
                error = %err,
                "dataset job finished with error"
            );
        }
    }
}
