//! Operator configuration file

use anyhow::{Context, Result};
use serde::Deserialize;
use staking_core::{Address, Amount};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "./ledger-data";
pub const DEFAULT_SNAPSHOT_NAME: &str = "ledger";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub genesis: GenesisConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenesisConfig {
    pub owner: Option<Address>,
    /// TOML integers are signed 64-bit, so a supply above `i64::MAX` can
    /// only be given with `init --supply`.
    pub initial_supply: Option<Amount>,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_snapshot_name")]
    pub snapshot_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            snapshot_name: default_snapshot_name(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_snapshot_name() -> String {
    DEFAULT_SNAPSHOT_NAME.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Config {
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid config file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&contents)
    }

    /// Load `path` if given and present, otherwise defaults. A missing file
    /// is not an error; a malformed one is. The returned path is the missing
    /// file, reported once logging is up.
    pub fn load_or_default(path: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        match path {
            Some(path) if path.exists() => Ok((Self::load(path)?, None)),
            Some(path) => Ok((Self::default(), Some(path.to_path_buf()))),
            None => Ok((Self::default(), None)),
        }
    }
}
