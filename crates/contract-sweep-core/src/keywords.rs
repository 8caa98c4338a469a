use crate::error::{require_dir, Error};
use crate::progress::ProgressReporter;
use crate::report::ActionSummary;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};
use walkdir::WalkDir;

/// Keywords from the first column of a CSV file, header row skipped.
/// Blank cells are ignored and values are trimmed.
pub fn load_keywords_csv(path: &Path) -> Result<Vec<String>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut keywords = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(first) = record.get(0).map(str::trim).filter(|k| !k.is_empty()) {
            keywords.push(first.to_string());
        }
    }

    if keywords.is_empty() {
        return Err(Error::NoKeywords(path.to_path_buf()));
    }
    Ok(keywords)
}

/// Keywords are matched case-insensitively against the file name only.
pub fn name_matches(file_name: &str, keywords: &[String]) -> bool {
    let lower = file_name.to_lowercase();
    keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
}

pub fn find_matching_files(dir: &Path, keywords: &[String]) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                error!("Error walking {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| name_matches(&entry.file_name().to_string_lossy(), keywords))
        .map(|entry| entry.into_path())
        .collect()
}

/// Delete `files`, one at a time, recording each failure.
pub fn delete_files(files: &[PathBuf], reporter: &dyn ProgressReporter) -> ActionSummary {
    let start = Instant::now();
    let mut summary = ActionSummary::new("Deletion Summary");
    summary.matched = files.len();

    reporter.on_action_start("Deleting files", files.len());
    for (idx, file) in files.iter().enumerate() {
        info!("Processing file {} of {}: {}", idx + 1, files.len(), file.display());
        let size = fs::metadata(file).map(|m| m.len()).unwrap_or(0);
        match fs::remove_file(file) {
            Ok(()) => {
                info!("Deleted: {}", file.display());
                summary.succeeded += 1;
                summary.bytes_freed += size;
            }
            Err(e) => summary.record_failure(file, e),
        }
        reporter.on_action_progress(idx + 1, files.len());
    }

    summary.elapsed = start.elapsed();
    reporter.on_action_complete(summary.succeeded, summary.failed.len(), summary.elapsed.as_secs_f64());
    summary
}

/// Validate inputs before touching anything, then list the matching files.
pub fn plan_keyword_deletion(dir: &Path, keywords_csv: &Path) -> Result<(Vec<String>, Vec<PathBuf>), Error> {
    require_dir(dir)?;
    let keywords = load_keywords_csv(keywords_csv)?;
    info!("Loaded {} keywords from {}", keywords.len(), keywords_csv.display());
    let files = find_matching_files(dir, &keywords);
    Ok((keywords, files))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_matches_is_case_insensitive() {
        let keywords = vec!["ROUGH".to_string(), "redline".to_string()];
        assert!(name_matches("acme_rough_cut.pdf", &keywords));
        assert!(name_matches("Acme REDLINE v2.docx", &keywords));
        assert!(!name_matches("Acme MSA.pdf", &keywords));
    }

    #[test]
    fn test_load_keywords_csv() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("keywords.csv");
        fs::write(&path, "keyword,notes\nROUGH,first pass\n  redline  \n,\n\ncomments,x\n").unwrap();
        assert_eq!(load_keywords_csv(&path).unwrap(), vec!["ROUGH", "redline", "comments"]);
    }

    #[test]
    fn test_load_keywords_csv_header_only_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("keywords.csv");
        fs::write(&path, "keyword\n").unwrap();
        assert!(matches!(load_keywords_csv(&path), Err(Error::NoKeywords(_))));
    }

    #[test]
    fn test_load_keywords_csv_missing_file() {
        let result = load_keywords_csv(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(Error::Csv(_))));
    }
}
