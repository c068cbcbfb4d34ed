//! Reset mode: forget everything learned so the next run starts cold

use anyhow::{Context, Result};
use log::info;

use crate::rl::TableStore;

/// Delete the persisted table, returning whether anything was removed
pub fn clear_table<S: TableStore + ?Sized>(store: &S) -> Result<bool> {
    let removed = store.clear().context("Failed to clear saved Q-table")?;

    if removed {
        info!("Saved Q-table removed; the next run starts from scratch");
    } else {
        info!("No saved Q-table to remove");
    }

    Ok(removed)
}
