use crate::hasher;
use crate::scanner::FileRecord;
use ahash::AHashMap;
use regex::Regex;
use std::cmp::Reverse;
use std::path::Path;
use tracing::error;

lazy_static::lazy_static! {
    static ref COPY_SUFFIX: Regex = Regex::new(r"(?i)\s+copy\s*\d*$").unwrap();
    static ref NUMBER_SUFFIX: Regex = Regex::new(r"\s+\(\d+\)$").unwrap();
}

/// Files whose names differ only by a copy marker, e.g. `MSA.pdf`, `MSA copy.pdf`
/// and `MSA (2).pdf`. Members are sorted newest first.
#[derive(Debug, Clone)]
pub struct NameGroup {
    pub base_name: String,
    pub files: Vec<FileRecord>,
    /// `None` when one of the files could not be read.
    pub identical_content: Option<bool>,
}

impl NameGroup {
    /// Bytes held by every member except the newest.
    pub fn reviewable_bytes(&self) -> u64 {
        self.files.iter().skip(1).map(|f| f.size).sum()
    }
}

/// Strip ` copy`, ` copy 2` and ` (1)` style suffixes from the file stem.
pub fn normalize_file_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let stripped = COPY_SUFFIX.replace(&stem, "");
    let stripped = NUMBER_SUFFIX.replace(&stripped, "");
    stripped.trim().to_string()
}

pub fn group_by_normalized_name(files: &[FileRecord]) -> Vec<NameGroup> {
    let mut by_name: AHashMap<String, Vec<FileRecord>> = AHashMap::new();
    for file in files {
        by_name
            .entry(normalize_file_name(&file.file_name()))
            .or_default()
            .push(file.clone());
    }

    let mut groups: Vec<NameGroup> = by_name
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|(base_name, mut files)| {
            files.sort_by_key(|f| (Reverse(f.modified), f.path.clone()));
            let identical_content = all_identical(&files);
            NameGroup {
                base_name,
                files,
                identical_content,
            }
        })
        .collect();
    groups.sort_by(|a, b| a.base_name.cmp(&b.base_name));
    groups
}

fn all_identical(files: &[FileRecord]) -> Option<bool> {
    let mut digests = Vec::with_capacity(files.len());
    for file in files {
        match hasher::content_digest(&file.path) {
            Ok(d) => digests.push(d),
            Err(e) => {
                error!("Error reading {}: {}", file.path.display(), e);
                return None;
            }
        }
    }
    Some(digests.windows(2).all(|w| w[0] == w[1]))
}
