use crate::error::{require_dir, Error};
use crate::fsops;
use crate::progress::ProgressReporter;
use crate::report::ActionSummary;
use crate::scanner::{self, FileRecord, WalkOptions};
use chrono::{DateTime, Datelike, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampSource {
    /// Birth time, or modification time where the platform has none.
    #[default]
    Created,
    Modified,
}

#[derive(Debug, Clone, Default)]
pub struct OrganizeOptions {
    pub timestamp: TimestampSource,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub year: i32,
}

pub fn year_of(time: SystemTime) -> i32 {
    DateTime::<Local>::from(time).year()
}

fn file_year(file: &FileRecord, source: TimestampSource) -> i32 {
    match source {
        TimestampSource::Created => year_of(file.created),
        TimestampSource::Modified => year_of(file.modified),
    }
}

/// Top-level files of `dir` and the year folder each belongs in.
/// Files already inside year folders are not looked at.
pub fn plan_moves(dir: &Path, options: &OrganizeOptions, reporter: &dyn ProgressReporter) -> Vec<PlannedMove> {
    let walk = WalkOptions {
        flat: true,
        skip_hidden: true,
        ..WalkOptions::default()
    };
    scanner::collect_files(dir, &walk, reporter)
        .into_iter()
        .map(|file| PlannedMove {
            year: file_year(&file, options.timestamp),
            source: file.path,
        })
        .collect()
}

/// Move every top-level file of `dir` into `dir/<year>/`.
pub fn organize_by_year(
    dir: &Path,
    options: &OrganizeOptions,
    reporter: &dyn ProgressReporter,
) -> Result<ActionSummary, Error> {
    require_dir(dir)?;
    let start = Instant::now();
    let plan = plan_moves(dir, options, reporter);
    let mut summary = ActionSummary::new("Organize By Year Summary");
    summary.matched = plan.len();
    summary.dry_run = options.dry_run;

    reporter.on_action_start("Moving files", plan.len());
    for (idx, planned) in plan.iter().enumerate() {
        let target_dir = dir.join(planned.year.to_string());
        if options.dry_run {
            info!("Would move {} to {}", planned.source.display(), target_dir.display());
            summary.succeeded += 1;
            continue;
        }
        match move_into(&planned.source, &target_dir) {
            Ok(target) => {
                info!("Moved {} to {}", planned.source.display(), target.display());
                summary.succeeded += 1;
            }
            Err(e) => summary.record_failure(&planned.source, e),
        }
        reporter.on_action_progress(idx + 1, plan.len());
    }

    summary.elapsed = start.elapsed();
    reporter.on_action_complete(summary.succeeded, summary.failed.len(), summary.elapsed.as_secs_f64());
    Ok(summary)
}

fn move_into(source: &Path, target_dir: &Path) -> std::io::Result<PathBuf> {
    fs::create_dir_all(target_dir)?;
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let target = fsops::unique_destination(target_dir, &name);
    fsops::move_path(source, &target)?;
    Ok(target)
}
