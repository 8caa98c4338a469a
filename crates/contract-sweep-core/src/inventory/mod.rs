pub mod customers;
pub mod summary;

use crate::error::{require_dir, Error};
use crate::progress::ProgressReporter;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{Instant, SystemTime};
use tracing::{error, info};
use walkdir::WalkDir;

pub const NOT_AVAILABLE: &str = "N/A";

/// One file in a flat inventory. Column names match the CSV header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRow {
    #[serde(rename = "File Path")]
    pub file_path: String,
    #[serde(rename = "File Name")]
    pub file_name: String,
    #[serde(rename = "Extension")]
    pub extension: String,
    /// Bytes, or `N/A` when metadata could not be read.
    #[serde(rename = "Size (bytes)")]
    pub size: String,
    #[serde(rename = "Creation Date")]
    pub created: String,
    #[serde(rename = "Modification Date")]
    pub modified: String,
}

pub const INVENTORY_COLUMNS: [&str; 6] = [
    "File Path",
    "File Name",
    "Extension",
    "Size (bytes)",
    "Creation Date",
    "Modification Date",
];

fn iso_local(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

impl InventoryRow {
    pub fn for_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let (size, created, modified) = match fs::metadata(path).and_then(|m| {
            let modified = m.modified()?;
            Ok((m.len(), m.created().unwrap_or(modified), modified))
        }) {
            Ok((len, created, modified)) => (len.to_string(), iso_local(created), iso_local(modified)),
            Err(e) => {
                error!("Error reading metadata for {}: {}", path.display(), e);
                (
                    NOT_AVAILABLE.to_string(),
                    NOT_AVAILABLE.to_string(),
                    NOT_AVAILABLE.to_string(),
                )
            }
        };

        Self {
            file_path: path.to_string_lossy().into_owned(),
            file_name,
            extension,
            size,
            created,
            modified,
        }
    }
}

/// One row per file under `root`, in walk order.
pub fn build_inventory(root: &Path, reporter: &dyn ProgressReporter) -> Result<Vec<InventoryRow>, Error> {
    require_dir(root)?;
    reporter.on_walk_start("Building inventory");
    let start = Instant::now();

    let mut rows = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!("Error walking {}: {}", root.display(), e);
                continue;
            }
        };
        if entry.file_type().is_file() {
            rows.push(InventoryRow::for_path(entry.path()));
            reporter.on_walk_progress(rows.len(), &entry.path().to_string_lossy());
        }
    }

    reporter.on_walk_complete(rows.len(), start.elapsed().as_secs_f64());
    Ok(rows)
}

pub fn write_inventory_csv(rows: &[InventoryRow], output: &Path) -> Result<(), Error> {
    ensure_parent(output)?;
    let mut writer = csv::Writer::from_path(output)?;
    if rows.is_empty() {
        writer.write_record(INVENTORY_COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("Inventory complete. CSV output saved to {}", output.display());
    Ok(())
}

pub fn read_inventory_csv(input: &Path) -> Result<Vec<InventoryRow>, Error> {
    let mut reader = csv::Reader::from_path(input)?;
    let headers = reader.headers()?.clone();
    for column in INVENTORY_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::MissingColumn(column.to_string()));
        }
    }
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

pub(crate) fn ensure_parent(path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
