use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use fakeset_jobs::JobConfig;
use fakeset_jobs::atomic::write_bytes_atomic;

use crate::CliError;

pub const DEFAULT_CONFIG_FILE: &str = "fakeset.toml";
pub const CONFIG_ENV: &str = "FAKESET_CONFIG";

/// Contents of `fakeset.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root for dataset records (`records/`) and generated files (`files/`).
    pub data_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    pub jobs: JobConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("fakeset-data"),
            log_file: None,
            jobs: JobConfig::default(),
        }
    }
}

impl Settings {
    pub fn records_dir(&self) -> PathBuf {
        self.data_dir.join("records")
    }

    pub fn files_dir(&self) -> PathBuf {
        self.data_dir.join("files")
    }
}

/// Explicit path, then `FAKESET_CONFIG`, then `fakeset.toml`.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Read settings from `path`, writing the defaults there first if the file
/// does not exist.
pub fn load_or_create_settings(path: &Path) -> Result<Settings, CliError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        return Ok(settings);
    }

    let settings = Settings::default();
    save_settings(path, &settings)?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), CliError> {
    let encoded = toml::to_string_pretty(settings)?;
    write_bytes_atomic(path, encoded.as_bytes())?;
    Ok(())
}
