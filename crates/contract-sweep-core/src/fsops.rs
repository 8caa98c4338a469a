//! Small filesystem helpers shared by the operations that move or copy files.

use crate::hasher;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Where a file should land in `dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Free path, nothing there yet.
    Free(PathBuf),
    /// A file with identical content already sits at this path.
    AlreadyPresent(PathBuf),
}

/// `name`, then `stem_1.ext`, `stem_2.ext`, ... inside `dir`.
pub fn candidate_name(file_name: &str, counter: usize) -> String {
    if counter == 0 {
        return file_name.to_string();
    }
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, counter, ext.to_string_lossy()),
        None => format!("{}_{}", stem, counter),
    }
}

/// First path in `dir` for `file_name` that does not exist yet.
pub fn unique_destination(dir: &Path, file_name: &str) -> PathBuf {
    let mut counter = 0;
    loop {
        let candidate = dir.join(candidate_name(file_name, counter));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Like `unique_destination`, but stops at a candidate whose content already
/// matches `source`, so repeated copies of the same file are not duplicated.
pub fn place_copy(dir: &Path, file_name: &str, source: &Path) -> io::Result<Placement> {
    let mut counter = 0;
    loop {
        let candidate = dir.join(candidate_name(file_name, counter));
        if !candidate.exists() {
            return Ok(Placement::Free(candidate));
        }
        if candidate.is_file() && hasher::same_content(&candidate, source)? {
            return Ok(Placement::AlreadyPresent(candidate));
        }
        counter += 1;
    }
}

/// Copy a file and carry its modification time over.
pub fn copy_preserving(source: &Path, dest: &Path) -> io::Result<u64> {
    let bytes = fs::copy(source, dest)?;
    let modified = fs::metadata(source)?.modified()?;
    fs::File::options().write(true).open(dest)?.set_modified(modified)?;
    Ok(bytes)
}

/// Rename, falling back to copy-and-remove when crossing filesystems.
pub fn move_path(source: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(err) if is_cross_device(&err) => {
            if source.is_dir() {
                copy_dir_recursive(source, dest)?;
                fs::remove_dir_all(source)
            } else {
                copy_preserving(source, dest)?;
                fs::remove_file(source)
            }
        }
        Err(err) => Err(err),
    }
}

#[cfg(windows)]
fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(17) // ERROR_NOT_SAME_DEVICE
}

#[cfg(not(windows))]
fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(18) // EXDEV
}

fn copy_dir_recursive(source: &Path, dest: &Path) -> io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            copy_preserving(&entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Remove a file or a whole directory tree.
pub fn remove_path(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_name() {
        assert_eq!(candidate_name("Acme MSA.pdf", 0), "Acme MSA.pdf");
        assert_eq!(candidate_name("Acme MSA.pdf", 2), "Acme MSA_2.pdf");
        assert_eq!(candidate_name("README", 1), "README_1");
        assert_eq!(candidate_name("archive.tar.gz", 1), "archive.tar_1.gz");
    }

    #[test]
    fn test_unique_destination_skips_taken_names() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.pdf"), "1").unwrap();
        fs::write(tmp.path().join("a_1.pdf"), "2").unwrap();
        assert_eq!(
            unique_destination(tmp.path(), "a.pdf"),
            tmp.path().join("a_2.pdf")
        );
    }

    #[test]
    fn test_place_copy_detects_existing_copy() {
        let tmp = tempfile::tempdir().unwrap();
        let src_dir = tmp.path().join("src");
        let dst_dir = tmp.path().join("dst");
        fs::create_dir_all(&src_dir).unwrap();
        fs::create_dir_all(&dst_dir).unwrap();
        fs::write(src_dir.join("a.pdf"), "new").unwrap();
        fs::write(dst_dir.join("a.pdf"), "other").unwrap();
        fs::write(dst_dir.join("a_1.pdf"), "new").unwrap();

        let placement = place_copy(&dst_dir, "a.pdf", &src_dir.join("a.pdf")).unwrap();
        assert_eq!(placement, Placement::AlreadyPresent(dst_dir.join("a_1.pdf")));
    }
}
