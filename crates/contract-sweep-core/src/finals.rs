use crate::error::{require_dir, Error};
use crate::fsops::{self, Placement};
use crate::progress::ProgressReporter;
use crate::report::ActionSummary;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct CopyFinalsOptions {
    /// Folder names (compared case-insensitively) whose PDFs are copied.
    pub folder_names: Vec<String>,
    pub dry_run: bool,
}

impl Default for CopyFinalsOptions {
    fn default() -> Self {
        Self {
            folder_names: vec!["final".to_string(), "finals".to_string()],
            dry_run: false,
        }
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn in_final_folder(path: &Path, folder_names: &[String]) -> bool {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| {
            let name = name.to_string_lossy().to_lowercase();
            folder_names.iter().any(|f| f.to_lowercase() == name)
        })
        .unwrap_or(false)
}

/// PDFs sitting directly inside a "final"/"finals" folder anywhere below `source`.
pub fn find_final_pdfs(source: &Path, options: &CopyFinalsOptions) -> Vec<PathBuf> {
    WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                error!("Error walking {}: {}", source.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_pdf(path) && in_final_folder(path, &options.folder_names))
        .collect()
}

/// Copy final PDFs into `dest`. Name clashes get a `_N` suffix; a file whose
/// content is already present under one of those names is skipped.
pub fn copy_final_pdfs(
    source: &Path,
    dest: &Path,
    options: &CopyFinalsOptions,
    reporter: &dyn ProgressReporter,
) -> Result<ActionSummary, Error> {
    require_dir(source)?;
    if !options.dry_run {
        fs::create_dir_all(dest)?;
    }

    let start = Instant::now();
    let pdfs = find_final_pdfs(source, options);
    let mut summary = ActionSummary::new("Copy Final PDFs Summary");
    summary.matched = pdfs.len();
    summary.dry_run = options.dry_run;

    reporter.on_action_start("Copying final PDFs", pdfs.len());
    for (idx, pdf) in pdfs.iter().enumerate() {
        if options.dry_run {
            info!("Would copy {}", pdf.display());
            summary.succeeded += 1;
            continue;
        }
        let name = pdf
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match fsops::place_copy(dest, &name, pdf) {
            Ok(Placement::Free(target)) => match fsops::copy_preserving(pdf, &target) {
                Ok(_) => {
                    info!("Copied {} to {}", pdf.display(), target.display());
                    summary.succeeded += 1;
                }
                Err(e) => summary.record_failure(pdf, e),
            },
            Ok(Placement::AlreadyPresent(existing)) => {
                debug!("{} already copied as {}", pdf.display(), existing.display());
                summary.skipped += 1;
            }
            Err(e) => summary.record_failure(pdf, e),
        }
        reporter.on_action_progress(idx + 1, pdfs.len());
    }

    summary.elapsed = start.elapsed();
    reporter.on_action_complete(summary.succeeded, summary.failed.len(), summary.elapsed.as_secs_f64());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_final_folder() {
        let names = CopyFinalsOptions::default().folder_names;
        assert!(in_final_folder(Path::new("/c/Acme/Final/msa.pdf"), &names));
        assert!(in_final_folder(Path::new("/c/Acme/FINALS/msa.pdf"), &names));
        assert!(!in_final_folder(Path::new("/c/Acme/Final Drafts/msa.pdf"), &names));
        assert!(!in_final_folder(Path::new("/c/Acme/Final/sub/msa.pdf"), &names));
    }

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf(Path::new("a.PDF")));
        assert!(!is_pdf(Path::new("a.docx")));
        assert!(!is_pdf(Path::new("pdf")));
    }
}
