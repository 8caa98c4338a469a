use crate::error::{require_dir, Error};
use crate::fsops;
use crate::fuzzy;
use crate::progress::ProgressReporter;
use crate::report::ActionSummary;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;
use tracing::{info, warn};

/// What happens when a moved file's name already exists in the canonical folder.
/// Two directories with the same name are always merged recursively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Move under the next free `name_N.ext`.
    #[default]
    Rename,
    /// Leave the file where it is; its source folder is then kept.
    Skip,
    /// Replace the file in the canonical folder.
    Overwrite,
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rename" => Ok(CollisionPolicy::Rename),
            "skip" => Ok(CollisionPolicy::Skip),
            "overwrite" => Ok(CollisionPolicy::Overwrite),
            other => Err(format!(
                "unknown collision policy '{}' (expected rename, skip or overwrite)",
                other
            )),
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CollisionPolicy::Rename => "rename",
            CollisionPolicy::Skip => "skip",
            CollisionPolicy::Overwrite => "overwrite",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub threshold: f64,
    pub collision: CollisionPolicy,
    pub dry_run: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            threshold: 80.0,
            collision: CollisionPolicy::default(),
            dry_run: false,
        }
    }
}

/// Near-duplicate folders and the one they fold into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeGroup {
    /// Alphabetically first name of the group.
    pub canonical: String,
    pub others: Vec<String>,
}

/// Names of the immediate subdirectories of `root`, sorted.
pub fn list_subfolders(root: &Path) -> Result<Vec<String>, Error> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

pub fn plan_merges(root: &Path, threshold: f64) -> Result<Vec<MergeGroup>, Error> {
    require_dir(root)?;
    let names = list_subfolders(root)?;
    info!("Found {} customer directories.", names.len());

    Ok(fuzzy::group(&names, threshold)
        .into_iter()
        .filter(|g| g.len() > 1)
        .map(|mut g| {
            let canonical = g.remove(0);
            MergeGroup {
                canonical,
                others: g,
            }
        })
        .collect())
}

/// Fold every near-duplicate folder into its canonical sibling. A source
/// folder is removed only once it is empty.
pub fn merge_folders(
    root: &Path,
    options: &MergeOptions,
    reporter: &dyn ProgressReporter,
) -> Result<(Vec<MergeGroup>, ActionSummary), Error> {
    let start = Instant::now();
    let groups = plan_merges(root, options.threshold)?;
    let mut summary = ActionSummary::new("Folder Merge Summary");
    summary.matched = groups.iter().map(|g| g.others.len()).sum();
    summary.dry_run = options.dry_run;

    reporter.on_action_start("Merging folders", summary.matched);
    let mut done = 0;
    for group in &groups {
        info!("Merging group: {:?} into '{}'", group.others, group.canonical);
        let canonical = root.join(&group.canonical);
        for other in &group.others {
            done += 1;
            if options.dry_run {
                summary.succeeded += 1;
                continue;
            }
            let source = root.join(other);
            merge_into(&source, &canonical, options.collision, &mut summary);
            match fs::remove_dir(&source) {
                Ok(()) => {
                    info!("  Merged and removed folder '{}'.", other);
                    summary.succeeded += 1;
                }
                Err(e) => warn!("  Could not remove folder '{}': {}", other, e),
            }
            reporter.on_action_progress(done, summary.matched);
        }
    }

    summary.elapsed = start.elapsed();
    reporter.on_action_complete(summary.succeeded, summary.failed.len(), summary.elapsed.as_secs_f64());
    Ok((groups, summary))
}

/// Move the contents of `source` into `dest`, recursing where both sides
/// hold a directory of the same name.
pub fn merge_into(source: &Path, dest: &Path, policy: CollisionPolicy, summary: &mut ActionSummary) {
    let mut entries: Vec<_> = match fs::read_dir(source) {
        Ok(rd) => rd.filter_map(|e| e.ok()).collect(),
        Err(e) => {
            summary.record_failure(source, e);
            return;
        }
    };
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let src = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let dst = dest.join(&name);

        let result = if fs::symlink_metadata(&dst).is_err() {
            fsops::move_path(&src, &dst)
        } else if src.is_dir() && dst.is_dir() {
            merge_into(&src, &dst, policy, summary);
            // Leftovers (skipped files) keep the directory alive.
            if let Err(e) = fs::remove_dir(&src) {
                warn!("  Kept {}: {}", src.display(), e);
            }
            continue;
        } else {
            match policy {
                CollisionPolicy::Skip => {
                    warn!("  {} already exists. Skipping {}.", dst.display(), src.display());
                    summary.skipped += 1;
                    continue;
                }
                CollisionPolicy::Rename => {
                    let renamed = fsops::unique_destination(dest, &name);
                    info!("  {} exists, moving {} as {}", dst.display(), src.display(), renamed.display());
                    fsops::move_path(&src, &renamed)
                }
                CollisionPolicy::Overwrite => {
                    info!("  Overwriting {}", dst.display());
                    fsops::remove_path(&dst).and_then(|_| fsops::move_path(&src, &dst))
                }
            }
        };

        if let Err(e) = result {
            summary.record_failure(&src, e);
        }
    }
}
