//! Process-wide Table Accessor
//!
//! Convenience wrapper for hosts that want one shared table per process.
//! Library code should take `&QuantileTable` explicitly; this module only
//! provides a single initialization barrier in front of that instance.

use crate::error::LoadError;
use crate::table::QuantileTable;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

static TABLE: OnceLock<QuantileTable> = OnceLock::new();

/// Load the table from `path` and install it, unless one is already installed
///
/// Returns the installed instance. Calling again after a successful init
/// returns the existing table without touching the filesystem.
pub fn init(path: impl AsRef<Path>) -> Result<&'static QuantileTable, LoadError> {
    if let Some(table) = TABLE.get() {
        debug!("Quantile table already initialized");
        return Ok(table);
    }

    let table = QuantileTable::from_path(path)?;
    Ok(install(table))
}

/// Install a prebuilt table, unless one is already installed
pub fn install(table: QuantileTable) -> &'static QuantileTable {
    TABLE.get_or_init(|| {
        info!("Installed process-wide quantile table: {} features", table.len());
        table
    })
}

/// The installed table
pub fn get() -> Result<&'static QuantileTable, LoadError> {
    TABLE.get().ok_or(LoadError::NotInitialized)
}

/// Whether a table has been installed
pub fn is_initialized() -> bool {
    TABLE.get().is_some()
}
