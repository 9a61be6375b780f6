//! Dataset jobs: load a dataset record, generate its rows, hand the bytes to
//! a storage sink and record the outcome.
//!
//! Jobs are scheduled through a [`JobDispatcher`] and executed by a
//! [`JobWorker`] with bounded concurrency.

pub mod atomic;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod job;
pub mod naming;
pub mod storage;
pub mod store;

pub use config::{JobConfig, RerunPolicy};
pub use dispatcher::{JobDispatcher, JobTask, JobWorker, QueueDispatcher, WorkerMetrics};
pub use errors::{JobError, QueueError, StorageError, StoreError};
pub use job::{DatasetJob, JobReport};
pub use naming::{OutputNaming, output_name, slugify};
pub use storage::{FsStorage, InMemoryStorage, StorageSink};
pub use store::{DatasetStore, FsStore, InMemoryStore};
