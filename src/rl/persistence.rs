//! Saving and loading the learned Q-table
//!
//! The table is stored as JSON together with the number of completed
//! episodes, so training resumes with the same exploration rate. Files
//! written by older versions that contain only the bare table are still
//! accepted; their episode count is taken as zero.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::encoder::EncodedState;
use super::q_table::{ActionValues, QTable};

/// One row of the saved table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    pub state: EncodedState,
    pub values: ActionValues,
}

/// Everything needed to resume training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub table: Vec<TableEntry>,
    pub episode_count: u64,
}

impl TableSnapshot {
    /// Capture `table`, rows sorted by state so output is stable
    pub fn from_table(table: &QTable, episode_count: u64) -> Self {
        let mut entries: Vec<TableEntry> = table
            .iter()
            .map(|(&state, &values)| TableEntry { state, values })
            .collect();
        entries.sort_by_key(|entry| entry.state);

        Self {
            table: entries,
            episode_count,
        }
    }

    pub fn into_table(self) -> QTable {
        QTable::from_entries(
            self.table
                .into_iter()
                .map(|entry| (entry.state, entry.values)),
        )
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Accepted on-disk layouts
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTable {
    Current(TableSnapshot),
    Legacy(Vec<TableEntry>),
}

impl From<StoredTable> for TableSnapshot {
    fn from(stored: StoredTable) -> Self {
        match stored {
            StoredTable::Current(snapshot) => snapshot,
            StoredTable::Legacy(table) => TableSnapshot {
                table,
                episode_count: 0,
            },
        }
    }
}

/// Parse a saved table in either the current or the legacy layout
pub fn parse_snapshot(json: &str) -> Result<TableSnapshot> {
    let stored: StoredTable =
        serde_json::from_str(json).context("Failed to deserialize Q-table")?;
    Ok(stored.into())
}

/// Storage for the learned table
///
/// Callers must not interleave calls with an in-progress training tick.
pub trait TableStore {
    /// Load the saved snapshot, `Ok(None)` when nothing has been saved
    fn load(&self) -> Result<Option<TableSnapshot>>;

    /// Save `snapshot`, replacing anything saved before
    fn save(&self, snapshot: &TableSnapshot) -> Result<()>;

    /// Remove saved data, returning whether anything was removed
    fn clear(&self) -> Result<bool>;
}

/// Load from `store`, falling back to a cold start on any failure
///
/// A corrupt table is not fatal: the table can be rebuilt by training.
pub fn restore_or_cold_start<S: TableStore + ?Sized>(store: &S) -> Option<TableSnapshot> {
    match store.load() {
        Ok(Some(snapshot)) => {
            info!(
                "Loaded Q-table with {} states, continuing from episode {}",
                snapshot.len(),
                snapshot.episode_count
            );
            Some(snapshot)
        }
        Ok(None) => {
            info!("No saved Q-table found, starting from scratch");
            None
        }
        Err(err) => {
            warn!("Error loading Q-table, starting from scratch: {err:#}");
            None
        }
    }
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableStore for JsonFileStore {
    fn load(&self) -> Result<Option<TableSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read Q-table from {:?}", self.path))?;
        parse_snapshot(&json)
            .with_context(|| format!("Invalid Q-table file {:?}", self.path))
            .map(Some)
    }

    fn save(&self, snapshot: &TableSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let json = serde_json::to_string(snapshot).context("Failed to serialize Q-table")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write Q-table to {:?}", self.path))?;

        info!(
            "Saved Q-table with {} states ({} episodes) to {:?}",
            snapshot.len(),
            snapshot.episode_count,
            self.path
        );
        Ok(())
    }

    fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }

        std::fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove {:?}", self.path))?;
        Ok(true)
    }
}

/// In-memory store for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<TableSnapshot>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: TableSnapshot) -> Self {
        Self {
            saved: Mutex::new(Some(snapshot)),
            saves: Mutex::new(0),
        }
    }

    /// Number of times [`TableStore::save`] has been called
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn saved(&self) -> Option<TableSnapshot> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl TableStore for MemoryStore {
    fn load(&self) -> Result<Option<TableSnapshot>> {
        Ok(self.saved())
    }

    fn save(&self, snapshot: &TableSnapshot) -> Result<()> {
        *self.saved.lock().unwrap_or_else(|e| e.into_inner()) = Some(snapshot.clone());
        *self.saves.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }

    fn clear(&self) -> Result<bool> {
        Ok(self
            .saved
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .is_some())
    }
}
