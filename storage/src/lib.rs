//! Staking Ledger Storage - File-Based Snapshots
//!
//! The ledger lives in memory; this crate persists point-in-time copies:
//! - JSON for human inspection
//! - Bincode for fast loading
//! - Invariant check before a loaded ledger is handed back

use serde::{Deserialize, Serialize};
use staking_core::{InvariantViolation, StakingLedger};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("Corrupt snapshot {name}: {violation}")]
    CorruptSnapshot {
        name: String,
        violation: InvariantViolation,
    },
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Directory of named snapshots.
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    /// Open storage directory, creating it if needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data_dir = path.as_ref().to_path_buf();

        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)?;
        }

        Ok(Self { data_dir })
    }

    fn json_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", name))
    }

    fn bin_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.bin", name))
    }

    /// Save a snapshot as both JSON and bincode
    pub fn save_snapshot<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        let bin = bincode::serialize(data)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(self.json_path(name), json)?;
        fs::write(self.bin_path(name), bin)?;
        Ok(())
    }

    /// Load a snapshot (tries bincode first, falls back to JSON)
    pub fn load_snapshot<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Result<T> {
        let bin_path = self.bin_path(name);
        if bin_path.exists() {
            let data = fs::read(&bin_path)?;
            return bincode::deserialize(&data)
                .map_err(|e| StorageError::SerializationError(e.to_string()));
        }

        let json_path = self.json_path(name);
        if json_path.exists() {
            let data = fs::read_to_string(&json_path)?;
            return serde_json::from_str(&data)
                .map_err(|e| StorageError::SerializationError(e.to_string()));
        }

        Err(StorageError::SnapshotNotFound(name.to_string()))
    }

    pub fn has_snapshot(&self, name: &str) -> bool {
        self.bin_path(name).exists() || self.json_path(name).exists()
    }

    /// Names of all snapshots in the directory, sorted
    pub fn list_snapshots(&self) -> Result<Vec<String>> {
        let mut snapshots = Vec::new();

        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            let is_snapshot = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("json") | Some("bin")
            );
            if !is_snapshot {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|n| n.to_str()) {
                if !snapshots.iter().any(|s| s == name) {
                    snapshots.push(name.to_string());
                }
            }
        }

        snapshots.sort();
        Ok(snapshots)
    }

    pub fn delete_snapshot(&self, name: &str) -> Result<()> {
        for path in [self.bin_path(name), self.json_path(name)] {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    /// Persist the ledger state. Pending events are not part of the state.
    pub fn save_ledger(&self, name: &str, ledger: &StakingLedger) -> Result<()> {
        self.save_snapshot(name, ledger)?;
        log::info!(
            "💾 Ledger snapshot '{}' saved (supply {}, stakes {}, rewards {})",
            name,
            ledger.total_supply(),
            ledger.total_stakes(),
            ledger.total_rewards()
        );
        Ok(())
    }

    /// Load a ledger and reject it if any accounting invariant is broken.
    pub fn load_ledger(&self, name: &str) -> Result<StakingLedger> {
        let ledger: StakingLedger = self.load_snapshot(name)?;
        ledger
            .check_invariants()
            .map_err(|violation| StorageError::CorruptSnapshot {
                name: name.to_string(),
                violation,
            })?;
        log::debug!(
            "Loaded ledger snapshot '{}' ({} stakeholders)",
            name,
            ledger.stakeholders().len()
        );
        Ok(ledger)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
