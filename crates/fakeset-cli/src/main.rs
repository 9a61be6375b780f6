mod logging;
mod settings;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use fakeset_core::{
    ColumnType, Dataset, DatasetId, Error as CoreError, SchemaDefinition, parse_schema_document,
};
use fakeset_generate::{GenerationEngine, GenerationError};
use fakeset_jobs::{
    DatasetJob, DatasetStore, FsStorage, FsStore, JobDispatcher, JobWorker, QueueError,
    StoreError,
};
use logging::init_logging;
use settings::{Settings, load_or_create_settings, resolve_config_path};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("schema error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "fakeset", version, about = "Synthetic delimited-text dataset generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registered column types.
    Types,
    /// Generate one dataset directly to a file or stdout.
    Generate(GenerateArgs),
    /// Register a schema and generate datasets through the job worker.
    Run(RunArgs),
    /// Print a stored dataset record.
    Status(StatusArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Schema document (JSON).
    #[arg(long)]
    schema: PathBuf,
    /// Number of data rows.
    #[arg(long)]
    rows: u64,
    /// Output file; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Schema document (JSON).
    #[arg(long)]
    schema: PathBuf,
    /// Number of data rows per dataset.
    #[arg(long)]
    rows: u64,
    /// Datasets to create for the schema.
    #[arg(long, default_value_t = 1)]
    datasets: usize,
    /// Overrides `data_dir` from the config file.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Config file; falls back to $FAKESET_CONFIG, then fakeset.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Append JSON log lines to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct StatusArgs {
    /// Dataset id.
    dataset: String,
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Types => run_types(),
        Command::Generate(args) => run_generate(args),
        Command::Run(args) => run_jobs(args).await,
        Command::Status(args) => run_status(args).await,
    }
}

fn run_types() -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{:<14} {:<14} {:<7} range", "type", "label", "quoted")?;
    for column_type in ColumnType::ALL {
        writeln!(
            stdout,
            "{:<14} {:<14} {:<7} {}",
            column_type.as_str(),
            column_type.label(),
            if column_type.is_quoted() { "yes" } else { "no" },
            if column_type.accepts_range() { "yes" } else { "no" },
        )?;
    }
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    init_logging(None)?;
    let schema = read_schema(&args.schema)?;
    let engine = GenerationEngine::default();
    let rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    };

    match args.out {
        Some(path) => {
            let summary = engine.generate_to_file(&schema, args.rows, &path, rng)?;
            tracing::info!(
                event = "dataset_written",
                path = %path.display(),
                rows = summary.rows(),
                bytes = summary.bytes,
                sha256 = %summary.sha256
            );
        }
        None => {
            let producer = engine.producer(&schema, args.rows, rng)?;
            producer.write_to(io::BufWriter::new(io::stdout().lock()))?;
        }
    }
    Ok(())
}

async fn run_jobs(args: RunArgs) -> Result<(), CliError> {
    let settings = load_settings(args.config, args.data_dir)?;
    let log_file = args.log_file.or_else(|| settings.log_file.clone());
    init_logging(log_file.as_deref())?;

    if args.datasets == 0 {
        return Err(CliError::InvalidConfig(
            "--datasets must be at least 1".to_string(),
        ));
    }

    let schema = read_schema(&args.schema)?;
    let store = Arc::new(FsStore::new(settings.records_dir()));
    let storage = Arc::new(FsStorage::new(settings.files_dir()));
    store.save_schema(&schema).await?;

    tracing::info!(
        event = "run_started",
        schema_id = %schema.id,
        datasets = args.datasets,
        rows = args.rows,
        data_dir = %settings.data_dir.display()
    );
    let timer = Instant::now();

    let job = DatasetJob::new(store.clone(), storage, settings.jobs.clone());
    let mut worker = JobWorker::new(job);
    worker.start();

    let dispatcher = worker
        .dispatcher()
        .ok_or_else(|| CliError::InvalidConfig("job queue is closed".to_string()))?;
    let dispatched =
        dispatch_datasets(&dispatcher, &*store, &schema, args.rows, args.datasets).await;
    drop(dispatcher);
    worker.drain().await;
    let ids = dispatched?;

    let metrics = worker.metrics().await;
    tracing::info!(
        event = "run_finished",
        completed = metrics.jobs_completed,
        failed = metrics.jobs_failed,
        duration_ms = timer.elapsed().as_millis() as u64
    );

    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        records.push(store.load_dataset(id).await?);
    }
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &records)?;
    writeln!(stdout)?;
    Ok(())
}

async fn dispatch_datasets(
    dispatcher: &impl JobDispatcher,
    store: &dyn DatasetStore,
    schema: &SchemaDefinition,
    rows: u64,
    count: usize,
) -> Result<Vec<DatasetId>, CliError> {
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        let dataset = Dataset::new(schema.id, rows);
        store.save_dataset(&dataset).await?;
        schedule_with_backoff(dispatcher, dataset.id).await?;
        ids.push(dataset.id);
    }
    Ok(ids)
}

async fn schedule_with_backoff(
    dispatcher: &impl JobDispatcher,
    dataset_id: DatasetId,
) -> Result<(), CliError> {
    loop {
        match dispatcher.schedule(dataset_id) {
            Ok(()) => return Ok(()),
            Err(QueueError::Full) => {
                tokio::time::sleep(std::time::Duration::from_millis(25)).await;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

async fn run_status(args: StatusArgs) -> Result<(), CliError> {
    let settings = load_settings(args.config, args.data_dir)?;
    let id: DatasetId = args.dataset.parse()?;
    let dataset = FsStore::new(settings.records_dir()).load_dataset(id).await?;
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &dataset)?;
    writeln!(stdout)?;
    Ok(())
}

fn load_settings(
    config: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<Settings, CliError> {
    let path = resolve_config_path(config.as_deref());
    let mut settings = load_or_create_settings(&path)?;
    if let Some(data_dir) = data_dir {
        settings.data_dir = data_dir;
    }
    Ok(settings)
}

fn read_schema(path: &std::path::Path) -> Result<SchemaDefinition, CliError> {
    let content = std::fs::read_to_string(path)?;
    let document = parse_schema_document(&content)?;
    Ok(document.into_definition(None))
}
