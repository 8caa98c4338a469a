pub mod digest;
pub mod xxhash;

use crate::progress::ProgressReporter;
use crate::scanner::FileRecord;
use ahash::AHashMap;
use std::time::Instant;
use tracing::error;

pub use digest::{content_digest, same_content};

/// Files sharing one content digest. Members keep walk order.
#[derive(Debug, Clone)]
pub struct ContentGroup {
    pub digest: String,
    pub file_size: u64,
    pub files: Vec<FileRecord>,
}

/// Three-tier grouping:
/// 1. file size, from the walk
/// 2. partial hash (first 1KB via XxHash64) to quickly eliminate non-matches
/// 3. full BLAKE3 digest only on partial-hash collisions
///
/// Returns confirmed duplicate groups (more than one member) ordered by the
/// path of their first member. Unreadable files are logged and left out.
pub fn build_content_groups(
    files: Vec<FileRecord>,
    reporter: &dyn ProgressReporter,
) -> Vec<ContentGroup> {
    let mut by_size: AHashMap<u64, Vec<FileRecord>> = AHashMap::new();
    let mut order: Vec<u64> = Vec::new();
    for file in files {
        let bucket = by_size.entry(file.size).or_default();
        if bucket.is_empty() {
            order.push(file.size);
        }
        bucket.push(file);
    }

    let candidates: usize = by_size.values().filter(|v| v.len() > 1).map(Vec::len).sum();
    reporter.on_hash_start(candidates);
    let start = Instant::now();
    let mut hashed = 0usize;
    let mut groups = Vec::new();

    for size in order {
        let Some(same_size) = by_size.remove(&size) else {
            continue;
        };
        if same_size.len() < 2 {
            continue;
        }

        // First pass: partial hash
        let mut by_partial: Vec<(u64, Vec<FileRecord>)> = Vec::new();
        for file in same_size {
            hashed += 1;
            reporter.on_hash_progress(hashed, candidates);
            match xxhash::partial_hash(&file.path) {
                Ok(hash) => push_keyed(&mut by_partial, hash, file),
                Err(e) => error!("Error processing file '{}': {}", file.path.display(), e),
            }
        }

        // Second pass: full digest only on partial-hash collisions
        for (_, files) in by_partial.into_iter().filter(|(_, f)| f.len() > 1) {
            let mut by_digest: Vec<(String, Vec<FileRecord>)> = Vec::new();
            for file in files {
                match digest::content_digest(&file.path) {
                    Ok(d) => push_keyed(&mut by_digest, d, file),
                    Err(e) => error!("Error processing file '{}': {}", file.path.display(), e),
                }
            }
            groups.extend(
                by_digest
                    .into_iter()
                    .filter(|(_, f)| f.len() > 1)
                    .map(|(digest, files)| ContentGroup {
                        digest,
                        file_size: size,
                        files,
                    }),
            );
        }
    }

    groups.sort_by(|a, b| a.files[0].path.cmp(&b.files[0].path));
    reporter.on_hash_complete(groups.len(), start.elapsed().as_secs_f64());
    groups
}

// Buckets stay in insertion order so group membership follows walk order.
fn push_keyed<K: PartialEq>(buckets: &mut Vec<(K, Vec<FileRecord>)>, key: K, file: FileRecord) {
    match buckets.iter_mut().find(|(k, _)| *k == key) {
        Some((_, files)) => files.push(file),
        None => buckets.push((key, vec![file])),
    }
}
