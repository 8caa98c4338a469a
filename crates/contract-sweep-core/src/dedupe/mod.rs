pub mod names;

use crate::error::{require_dir, Error};
use crate::hasher::{self, ContentGroup};
use crate::progress::ProgressReporter;
use crate::report::ActionSummary;
use crate::scanner::{self, FileRecord, WalkOptions};
use std::cmp::Reverse;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info};

pub use names::{normalize_file_name, NameGroup};

/// Which member of a duplicate group survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeepPolicy {
    #[default]
    EarliestCreated,
    NewestModified,
    /// Walk order, which is sorted by name within each directory.
    FirstEncountered,
}

impl FromStr for KeepPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "earliest-created" => Ok(KeepPolicy::EarliestCreated),
            "newest-modified" => Ok(KeepPolicy::NewestModified),
            "first-encountered" => Ok(KeepPolicy::FirstEncountered),
            other => Err(format!(
                "unknown keep policy '{}' (expected earliest-created, newest-modified or first-encountered)",
                other
            )),
        }
    }
}

impl fmt::Display for KeepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeepPolicy::EarliestCreated => "earliest-created",
            KeepPolicy::NewestModified => "newest-modified",
            KeepPolicy::FirstEncountered => "first-encountered",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct DedupeOptions {
    pub walk: WalkOptions,
    pub keep: KeepPolicy,
}

impl Default for DedupeOptions {
    fn default() -> Self {
        Self {
            walk: WalkOptions {
                skip_hidden: true,
                ..WalkOptions::default()
            },
            keep: KeepPolicy::default(),
        }
    }
}

/// A confirmed group of identical files split into the survivor and the rest.
#[derive(Debug, Clone)]
pub struct DuplicateSet {
    pub digest: String,
    pub file_size: u64,
    pub keep: FileRecord,
    pub redundant: Vec<FileRecord>,
}

impl DuplicateSet {
    pub fn from_group(group: ContentGroup, policy: KeepPolicy) -> Self {
        let mut files = group.files;
        let keep_index = choose_keep(&files, policy);
        let keep = files.remove(keep_index);
        Self {
            digest: group.digest,
            file_size: group.file_size,
            keep,
            redundant: files,
        }
    }

    pub fn reclaimable_bytes(&self) -> u64 {
        self.file_size * self.redundant.len() as u64
    }
}

/// Index of the survivor. Ties fall back to path order.
fn choose_keep(files: &[FileRecord], policy: KeepPolicy) -> usize {
    let indexed = files.iter().enumerate();
    let chosen = match policy {
        KeepPolicy::FirstEncountered => Some(0),
        KeepPolicy::EarliestCreated => indexed
            .min_by_key(|(_, f)| (f.created, f.path.clone()))
            .map(|(i, _)| i),
        KeepPolicy::NewestModified => indexed
            .min_by_key(|(_, f)| (Reverse(f.modified), f.path.clone()))
            .map(|(i, _)| i),
    };
    chosen.unwrap_or(0)
}

#[derive(Debug, Clone, Default)]
pub struct DuplicateReport {
    pub total_files: usize,
    pub sets: Vec<DuplicateSet>,
    pub name_groups: Vec<NameGroup>,
}

impl DuplicateReport {
    pub fn redundant_count(&self) -> usize {
        self.sets.iter().map(|s| s.redundant.len()).sum()
    }

    pub fn reclaimable_bytes(&self) -> u64 {
        self.sets.iter().map(DuplicateSet::reclaimable_bytes).sum()
    }

    /// The `n` sets that would free the most space.
    pub fn biggest_opportunities(&self, n: usize) -> Vec<&DuplicateSet> {
        let mut sets: Vec<&DuplicateSet> = self.sets.iter().collect();
        sets.sort_by_key(|s| (Reverse(s.reclaimable_bytes()), s.keep.path.clone()));
        sets.truncate(n);
        sets
    }

    /// Bytes held by every name-group member except the newest.
    pub fn reviewable_bytes(&self) -> u64 {
        self.name_groups.iter().map(NameGroup::reviewable_bytes).sum()
    }

    /// The `n` name groups holding the most bytes besides their newest file.
    pub fn biggest_name_groups(&self, n: usize) -> Vec<&NameGroup> {
        let mut groups: Vec<&NameGroup> = self.name_groups.iter().collect();
        groups.sort_by(|a, b| {
            b.reviewable_bytes()
                .cmp(&a.reviewable_bytes())
                .then_with(|| a.base_name.cmp(&b.base_name))
        });
        groups.truncate(n);
        groups
    }
}

/// Read-only pass: find duplicate groups and name-pattern groups under `root`.
pub fn scan_duplicates(
    root: &Path,
    options: &DedupeOptions,
    reporter: &dyn ProgressReporter,
) -> Result<DuplicateReport, Error> {
    require_dir(root)?;
    info!("Scanning {} for duplicate files...", root.display());

    let files = scanner::collect_files(root, &options.walk, reporter);
    let total_files = files.len();
    let name_groups = names::group_by_normalized_name(&files);

    let sets: Vec<DuplicateSet> = hasher::build_content_groups(files, reporter)
        .into_iter()
        .map(|group| DuplicateSet::from_group(group, options.keep))
        .collect();

    debug!(
        "{} files, {} duplicate groups, {} name groups",
        total_files,
        sets.len(),
        name_groups.len()
    );

    Ok(DuplicateReport {
        total_files,
        sets,
        name_groups,
    })
}

/// Scan, then delete every redundant member of each duplicate group.
/// A failed delete is logged and recorded; the run continues.
pub fn deduplicate(
    root: &Path,
    options: &DedupeOptions,
    reporter: &dyn ProgressReporter,
) -> Result<(DuplicateReport, ActionSummary), Error> {
    let report = scan_duplicates(root, options, reporter)?;
    let start = Instant::now();
    let mut summary = ActionSummary::new("Deduplication Summary");
    summary.matched = report.redundant_count();

    reporter.on_action_start("Deleting duplicates", summary.matched);
    let mut done = 0;
    for set in &report.sets {
        info!(
            "Duplicate group {} (keeping: {})",
            &set.digest[..12.min(set.digest.len())],
            set.keep.path.display()
        );
        for file in &set.redundant {
            match fs::remove_file(&file.path) {
                Ok(()) => {
                    info!("  Deleted duplicate: {}", file.path.display());
                    summary.succeeded += 1;
                    summary.bytes_freed += file.size;
                }
                Err(e) => summary.record_failure(&file.path, e),
            }
            done += 1;
            reporter.on_action_progress(done, summary.matched);
        }
    }

    summary.elapsed = start.elapsed();
    reporter.on_action_complete(summary.succeeded, summary.failed.len(), summary.elapsed.as_secs_f64());
    Ok((report, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    fn record(path: &str, created: u64, modified: u64) -> FileRecord {
        let epoch = SystemTime::UNIX_EPOCH;
        FileRecord {
            path: PathBuf::from(path),
            size: 10,
            created: epoch + Duration::from_secs(created),
            modified: epoch + Duration::from_secs(modified),
        }
    }

    #[test]
    fn test_keep_policies() {
        let files = vec![
            record("/c/b.pdf", 300, 100),
            record("/c/a.pdf", 100, 200),
            record("/c/c.pdf", 200, 300),
        ];
        assert_eq!(choose_keep(&files, KeepPolicy::FirstEncountered), 0);
        assert_eq!(choose_keep(&files, KeepPolicy::EarliestCreated), 1);
        assert_eq!(choose_keep(&files, KeepPolicy::NewestModified), 2);
    }

    #[test]
    fn test_keep_ties_break_on_path() {
        let files = vec![record("/c/z.pdf", 100, 100), record("/c/m.pdf", 100, 100)];
        assert_eq!(choose_keep(&files, KeepPolicy::EarliestCreated), 1);
        assert_eq!(choose_keep(&files, KeepPolicy::NewestModified), 1);
    }

    #[test]
    fn test_biggest_name_groups_rank_by_reviewable_bytes() {
        let group = |name: &str, sizes: &[u64]| NameGroup {
            base_name: name.to_string(),
            files: sizes
                .iter()
                .enumerate()
                .map(|(i, size)| FileRecord {
                    size: *size,
                    ..record(&format!("/c/{}_{}.pdf", name, i), 0, 100 - i as u64)
                })
                .collect(),
            identical_content: Some(false),
        };
        let report = DuplicateReport {
            total_files: 7,
            sets: Vec::new(),
            name_groups: vec![
                group("msa", &[500, 10]),
                group("nda", &[1, 300, 200]),
                group("sow", &[900, 50]),
            ],
        };

        assert_eq!(report.reviewable_bytes(), 10 + 500 + 50);
        let top: Vec<&str> = report
            .biggest_name_groups(2)
            .iter()
            .map(|g| g.base_name.as_str())
            .collect();
        assert_eq!(top, vec!["nda", "sow"]);
    }

    #[test]
    fn test_keep_policy_parse() {
        assert_eq!("Newest-Modified".parse::<KeepPolicy>(), Ok(KeepPolicy::NewestModified));
        assert!("oldest".parse::<KeepPolicy>().is_err());
        assert_eq!(KeepPolicy::EarliestCreated.to_string(), "earliest-created");
    }
}
