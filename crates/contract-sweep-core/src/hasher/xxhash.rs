use std::fs::File;
use std::hash::Hasher as _;
use std::io::{self, Read};
use std::path::Path;
use twox_hash::XxHash64;

const PARTIAL_HASH_LENGTH: usize = 1024; // 1KB

/// XxHash64 of the first 1KB of a file. Used only to split same-size
/// candidates before the full digest is taken.
pub fn partial_hash(file: &Path) -> io::Result<u64> {
    let data = read_portion(file)?;
    Ok(hash_data(&data))
}

fn read_portion(file: &Path) -> io::Result<Vec<u8>> {
    let f = File::open(file)?;
    let mut buffer = Vec::with_capacity(PARTIAL_HASH_LENGTH);
    f.take(PARTIAL_HASH_LENGTH as u64).read_to_end(&mut buffer)?;
    Ok(buffer)
}

pub fn hash_data(data: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(data);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_partial_hash_ignores_bytes_past_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let mut a = vec![7u8; PARTIAL_HASH_LENGTH];
        let mut b = a.clone();
        a.extend_from_slice(b"tail one");
        b.extend_from_slice(b"tail two");
        fs::write(tmp.path().join("a"), &a).unwrap();
        fs::write(tmp.path().join("b"), &b).unwrap();

        assert_eq!(
            partial_hash(&tmp.path().join("a")).unwrap(),
            partial_hash(&tmp.path().join("b")).unwrap()
        );
    }
}
