use chrono::Local;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

/// A single item an operation could not complete.
#[derive(Debug, Clone)]
pub struct FailedItem {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of a mutating run, written out as a Markdown log.
#[derive(Debug, Clone, Default)]
pub struct ActionSummary {
    pub title: String,
    pub matched: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: Vec<FailedItem>,
    pub bytes_freed: u64,
    pub elapsed: Duration,
    pub dry_run: bool,
}

impl ActionSummary {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn record_failure(&mut self, path: &Path, err: impl std::fmt::Display) {
        error!("Failed on '{}': {}", path.display(), err);
        self.failed.push(FailedItem {
            path: path.to_path_buf(),
            error: err.to_string(),
        });
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {}\n", self.title);
        if self.dry_run {
            let _ = writeln!(out, "_Dry run: nothing was changed._\n");
        }
        let _ = writeln!(out, "**Total matched:** {}\n", self.matched);
        let _ = writeln!(out, "**Succeeded:** {}\n", self.succeeded);
        if self.skipped > 0 {
            let _ = writeln!(out, "**Skipped:** {}\n", self.skipped);
        }
        let _ = writeln!(out, "**Failed:** {}\n", self.failed.len());
        if self.bytes_freed > 0 {
            let _ = writeln!(out, "**Space freed:** {}\n", format_size(self.bytes_freed));
        }
        let _ = writeln!(out, "**Elapsed time:** {:.2} seconds\n", self.elapsed.as_secs_f64());

        if !self.failed.is_empty() {
            let _ = writeln!(out, "## Failed Items\n");
            for item in &self.failed {
                let _ = writeln!(out, "- **Path:** {} - **Error:** {}", item.path.display(), item.error);
            }
        }
        out
    }

    /// Append this run to the log at `path`, after a timestamped rule, so
    /// earlier runs stay on record. Best-effort: failures are logged, never fatal.
    pub fn append_markdown(&self, path: &Path) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Could not create {}: {}", parent.display(), e);
                return;
            }
        }
        let entry = format!(
            "---\n\n_Logged {}_\n\n{}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.to_markdown()
        );
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(entry.as_bytes()));
        match result {
            Ok(()) => info!("Summary appended to {}", path.display()),
            Err(e) => error!("Could not write summary to {}: {}", path.display(), e),
        }
    }
}

/// Human-readable byte count, e.g. `1.5 KB`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512.0 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024 * 1024), "5120.0 GB");
    }

    #[test]
    fn test_markdown_lists_failures() {
        let mut summary = ActionSummary::new("Deletion Summary");
        summary.matched = 2;
        summary.succeeded = 1;
        summary.record_failure(Path::new("/x/locked.pdf"), "Permission denied");

        let md = summary.to_markdown();
        assert!(md.starts_with("# Deletion Summary"));
        assert!(md.contains("**Total matched:** 2"));
        assert!(md.contains("**Failed:** 1"));
        assert!(md.contains("- **Path:** /x/locked.pdf - **Error:** Permission denied"));
    }

    #[test]
    fn test_append_markdown_keeps_earlier_runs() {
        let tmp = tempfile::tempdir().unwrap();
        let log = tmp.path().join("logs/deletion_summary.md");

        let mut deletion = ActionSummary::new("Deletion Summary");
        deletion.succeeded = 3;
        deletion.append_markdown(&log);
        ActionSummary::new("Folder Merge Summary").append_markdown(&log);

        let text = fs::read_to_string(&log).unwrap();
        let first = text.find("# Deletion Summary").unwrap();
        let second = text.find("# Folder Merge Summary").unwrap();
        assert!(first < second);
        assert!(text.contains("**Succeeded:** 3"));
        assert_eq!(text.matches("_Logged ").count(), 2);
    }
}
