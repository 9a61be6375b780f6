use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use fakeset_core::{
    ColumnSeparator, ColumnType, Dataset, DatasetId, DatasetStatus, QuoteCharacter,
    SchemaDefinition,
};
use fakeset_jobs::{
    DatasetJob, DatasetStore, InMemoryStorage, InMemoryStore, JobConfig, JobDispatcher,
    JobWorker, QueueError, StorageError, StorageSink,
};

fn schema() -> SchemaDefinition {
    SchemaDefinition::new(
        "orders",
        ColumnSeparator::Pipe,
        QuoteCharacter::SingleQuote,
        [
            ("customer".to_string(), ColumnType::CompanyName),
            ("quantity".to_string(), ColumnType::Integer),
        ],
    )
}

fn worker(store: Arc<InMemoryStore>, storage: Arc<InMemoryStorage>, config: JobConfig) -> JobWorker {
    JobWorker::new(DatasetJob::new(store, storage, config))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn worker_processes_every_scheduled_dataset() {
    let store = Arc::new(InMemoryStore::new());
    let storage = Arc::new(InMemoryStorage::new());
    let schema = schema();
    store.save_schema(&schema).await.expect("save schema");

    let mut ids = Vec::new();
    for rows in 1..=8 {
        let dataset = Dataset::new(schema.id, rows * 10);
        store.save_dataset(&dataset).await.expect("save dataset");
        ids.push(dataset.id);
    }

    let config = JobConfig {
        max_concurrent_jobs: 3,
        ..JobConfig::default()
    };
    let mut worker = worker(store.clone(), storage.clone(), config);
    worker.start();

    let dispatcher = worker.dispatcher().expect("dispatcher");
    for id in &ids {
        dispatcher.schedule(*id).expect("schedule");
    }
    drop(dispatcher);
    worker.drain().await;

    for id in &ids {
        let dataset = store.load_dataset(*id).await.expect("load");
        assert_eq!(dataset.status(), DatasetStatus::Ready, "{id}");
    }
    assert_eq!(storage.names().await.len(), ids.len());

    let metrics = worker.metrics().await;
    assert_eq!(metrics.jobs_started, 8);
    assert_eq!(metrics.jobs_completed, 8);
    assert_eq!(metrics.jobs_failed, 0);
}

#[tokio::test]
async fn failed_jobs_are_counted() {
    let store = Arc::new(InMemoryStore::new());
    let storage = Arc::new(InMemoryStorage::new());
    let mut worker = worker(store, storage, JobConfig::default());
    worker.start();

    let dispatcher = worker.dispatcher().expect("dispatcher");
    dispatcher.schedule(DatasetId::new()).expect("schedule");
    drop(dispatcher);
    worker.drain().await;

    let metrics = worker.metrics().await;
    assert_eq!(metrics.jobs_failed, 1);
    assert_eq!(metrics.jobs_completed, 0);
}

#[tokio::test]
async fn full_queue_rejects_schedule() {
    let config = JobConfig {
        queue_capacity: 2,
        ..JobConfig::default()
    };
    let worker = worker(
        Arc::new(InMemoryStore::new()),
        Arc::new(InMemoryStorage::new()),
        config,
    );
    let dispatcher = worker.dispatcher().expect("dispatcher");

    dispatcher.schedule(DatasetId::new()).expect("first");
    dispatcher.schedule(DatasetId::new()).expect("second");
    assert_eq!(dispatcher.schedule(DatasetId::new()), Err(QueueError::Full));
}

#[tokio::test]
async fn stopped_worker_closes_queue() {
    let mut worker = worker(
        Arc::new(InMemoryStore::new()),
        Arc::new(InMemoryStorage::new()),
        JobConfig::default(),
    );
    worker.start();
    let dispatcher = worker.dispatcher().expect("dispatcher");
    worker.shutdown().await;

    assert_eq!(dispatcher.schedule(DatasetId::new()), Err(QueueError::Closed));
    assert!(worker.dispatcher().is_none());
}

struct SlowStorage {
    inner: InMemoryStorage,
    delay: Duration,
}

#[async_trait]
impl StorageSink for SlowStorage {
    async fn write_file(&self, name: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        tokio::time::sleep(self.delay).await;
        self.inner.write_file(name, bytes).await
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        self.inner.read_file(name).await
    }
}

#[tokio::test]
async fn drain_waits_for_queue_longer_than_one_job_timeout() {
    let store = Arc::new(InMemoryStore::new());
    let storage = Arc::new(SlowStorage {
        inner: InMemoryStorage::new(),
        delay: Duration::from_millis(700),
    });
    let schema = schema();
    store.save_schema(&schema).await.expect("save schema");

    let config = JobConfig {
        max_concurrent_jobs: 1,
        job_timeout_secs: 1,
        ..JobConfig::default()
    };
    let mut worker = JobWorker::new(DatasetJob::new(store.clone(), storage.clone(), config));
    worker.start();

    let dispatcher = worker.dispatcher().expect("dispatcher");
    let mut ids = Vec::new();
    for _ in 0..10 {
        let dataset = Dataset::new(schema.id, 2);
        store.save_dataset(&dataset).await.expect("save dataset");
        dispatcher.schedule(dataset.id).expect("schedule");
        ids.push(dataset.id);
    }
    drop(dispatcher);
    worker.drain().await;

    for id in &ids {
        let dataset = store.load_dataset(*id).await.expect("load");
        assert_eq!(dataset.status(), DatasetStatus::Ready, "{id}");
    }
    assert_eq!(storage.inner.names().await.len(), ids.len());
    assert_eq!(worker.metrics().await.jobs_completed, 10);
}
