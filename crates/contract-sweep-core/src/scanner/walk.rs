use super::FileRecord;
use crate::progress::ProgressReporter;
use glob::Pattern;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error};
use walkdir::WalkDir;

#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Only look at files directly inside the root.
    pub flat: bool,
    pub skip_hidden: bool,
    pub skip_empty: bool,
    pub ignore_globs: Vec<String>,
}

/// Walk `root` and return every regular file, sorted by path within each directory.
/// Symlinks are never followed. Unreadable entries are logged and skipped.
pub fn collect_files(
    root: &Path,
    options: &WalkOptions,
    reporter: &dyn ProgressReporter,
) -> Vec<FileRecord> {
    let ignore_patterns: Vec<Pattern> = options
        .ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect();

    let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
    if options.flat {
        walker = walker.max_depth(1);
    }

    reporter.on_walk_start("Scanning files");
    let start = Instant::now();
    let mut files = Vec::new();

    let entries = walker.into_iter().filter_entry(|entry| {
        if entry.depth() == 0 {
            return true;
        }
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        !(options.skip_hidden && hidden)
            && !ignore_patterns.iter().any(|p| p.matches_path(entry.path()))
    });

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                error!("Error walking {}: {}", root.display(), err);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(err) => {
                error!("Error reading metadata for {}: {}", entry.path().display(), err);
                continue;
            }
        };

        if options.skip_empty && metadata.len() == 0 {
            continue;
        }

        match FileRecord::from_metadata(entry.into_path(), &metadata) {
            Ok(record) => {
                reporter.on_walk_progress(files.len() + 1, &record.path.to_string_lossy());
                files.push(record);
            }
            Err(err) => error!("Error reading timestamps: {}", err),
        }
    }

    let duration = start.elapsed().as_secs_f64();
    reporter.on_walk_complete(files.len(), duration);
    debug!("Walk of {} found {} files in {:.2}s", root.display(), files.len(), duration);
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentReporter;
    use std::fs;

    fn names(files: &[FileRecord]) -> Vec<String> {
        files.iter().map(|f| f.file_name()).collect()
    }

    #[test]
    fn test_collect_files_recursive_and_flat() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("b.pdf"), "b").unwrap();
        fs::write(tmp.path().join("a.pdf"), "a").unwrap();
        fs::write(tmp.path().join("sub/c.pdf"), "c").unwrap();

        let all = collect_files(tmp.path(), &WalkOptions::default(), &SilentReporter);
        assert_eq!(names(&all), vec!["a.pdf", "b.pdf", "c.pdf"]);

        let flat = WalkOptions {
            flat: true,
            ..WalkOptions::default()
        };
        let top = collect_files(tmp.path(), &flat, &SilentReporter);
        assert_eq!(names(&top), vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_collect_files_skips_hidden_empty_and_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("archive")).unwrap();
        fs::write(tmp.path().join(".DS_Store"), "x").unwrap();
        fs::write(tmp.path().join("empty.pdf"), "").unwrap();
        fs::write(tmp.path().join("keep.pdf"), "k").unwrap();
        fs::write(tmp.path().join("archive/old.pdf"), "o").unwrap();

        let options = WalkOptions {
            flat: false,
            skip_hidden: true,
            skip_empty: true,
            ignore_globs: vec!["*/archive".to_string()],
        };
        let files = collect_files(tmp.path(), &options, &SilentReporter);
        assert_eq!(names(&files), vec!["keep.pdf"]);
    }
}
