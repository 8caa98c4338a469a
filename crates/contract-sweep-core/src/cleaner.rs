use crate::error::{require_dir, Error};
use crate::progress::ProgressReporter;
use crate::report::ActionSummary;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct CleanerOptions {
    /// Lowercase substrings; a folder whose name contains any of them is removed.
    pub substrings: Vec<String>,
    pub dry_run: bool,
}

impl Default for CleanerOptions {
    fn default() -> Self {
        Self {
            substrings: vec!["draft".to_string(), "working".to_string()],
            dry_run: false,
        }
    }
}

pub fn folder_matches(name: &str, substrings: &[String]) -> bool {
    let lower = name.to_lowercase();
    substrings.iter().any(|s| lower.contains(&s.to_lowercase()))
}

/// Matching folders below `base`. A match is not descended into, so nested
/// matches are covered by their outermost ancestor.
pub fn find_target_folders(base: &Path, substrings: &[String]) -> Vec<PathBuf> {
    let mut targets = Vec::new();
    let mut walker = WalkDir::new(base).min_depth(1).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!("Error walking {}: {}", base.display(), e);
                continue;
            }
        };
        if entry.file_type().is_dir() && folder_matches(&entry.file_name().to_string_lossy(), substrings) {
            targets.push(entry.into_path());
            walker.skip_current_dir();
        }
    }
    targets
}

pub fn delete_target_subfolders(
    base: &Path,
    options: &CleanerOptions,
    reporter: &dyn ProgressReporter,
) -> Result<ActionSummary, Error> {
    require_dir(base)?;
    let start = Instant::now();
    let targets = find_target_folders(base, &options.substrings);
    let mut summary = ActionSummary::new("Subfolder Cleanup Summary");
    summary.matched = targets.len();
    summary.dry_run = options.dry_run;

    reporter.on_action_start("Deleting folders", targets.len());
    for (idx, dir) in targets.iter().enumerate() {
        if options.dry_run {
            info!("Would delete folder: {}", dir.display());
            summary.succeeded += 1;
            continue;
        }
        match fs::remove_dir_all(dir) {
            Ok(()) => {
                info!("Deleted folder: {}", dir.display());
                summary.succeeded += 1;
            }
            Err(e) => summary.record_failure(dir, e),
        }
        reporter.on_action_progress(idx + 1, targets.len());
    }

    summary.elapsed = start.elapsed();
    reporter.on_action_complete(summary.succeeded, summary.failed.len(), summary.elapsed.as_secs_f64());
    info!("Deleted {} folder(s) matching target substrings.", summary.succeeded);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_matches() {
        let subs = CleanerOptions::default().substrings;
        assert!(folder_matches("Draft_v1", &subs));
        assert!(folder_matches("Working_Notes", &subs));
        assert!(folder_matches("old DRAFTS", &subs));
        assert!(!folder_matches("Final", &subs));
    }

    #[test]
    fn test_nested_matches_collapse_to_outermost() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("Acme/Drafts/Working")).unwrap();
        fs::create_dir_all(tmp.path().join("Acme/Final")).unwrap();

        let targets = find_target_folders(tmp.path(), &CleanerOptions::default().substrings);
        assert_eq!(targets, vec![tmp.path().join("Acme/Drafts")]);
    }
}
