use std::fs::File;
use std::io;
use std::path::Path;

/// BLAKE3 digest of the whole file, hex encoded. This is the duplicate key.
pub fn content_digest(file: &Path) -> io::Result<String> {
    let mut f = File::open(file)?;
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut f, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}

/// True when both files exist and have identical content.
pub fn same_content(a: &Path, b: &Path) -> io::Result<bool> {
    let (meta_a, meta_b) = (a.metadata()?, b.metadata()?);
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }
    Ok(content_digest(a)? == content_digest(b)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_same_content() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a.pdf");
        let b = tmp.path().join("b.pdf");
        let c = tmp.path().join("c.pdf");
        fs::write(&a, "signed contract").unwrap();
        fs::write(&b, "signed contract").unwrap();
        fs::write(&c, "signed contracT").unwrap();

        assert!(same_content(&a, &b).unwrap());
        assert!(!same_content(&a, &c).unwrap());
        assert_eq!(content_digest(&a).unwrap().len(), 64);
    }
}
