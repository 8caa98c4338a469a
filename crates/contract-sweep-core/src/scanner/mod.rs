pub mod walk;

use std::fs::Metadata;
use std::path::PathBuf;
use std::time::SystemTime;

pub use walk::{collect_files, WalkOptions};

/// A file discovered during a walk. Identity is the path.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
    /// Birth time where the platform reports one, otherwise the modification time.
    pub created: SystemTime,
    pub modified: SystemTime,
}

impl FileRecord {
    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> std::io::Result<Self> {
        let modified = metadata.modified()?;
        let created = metadata.created().unwrap_or(modified);
        Ok(Self {
            path,
            size: metadata.len(),
            created,
            modified,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
