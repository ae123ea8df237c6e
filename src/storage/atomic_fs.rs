//! Atomic file replacement
//!
//! Writes go to a temporary file in the destination directory, are verified
//! against a SHA-256 content hash, then renamed over the target. Rename is
//! atomic on a single filesystem, so readers never observe a torn document.

use std::fs;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

/// SHA-256 hash of a byte slice, hex encoded
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// SHA-256 hash of a file's contents, hex encoded
pub fn file_hash(path: &Path) -> io::Result<String> {
    let content = fs::read(path)?;
    Ok(content_hash(&content))
}

/// Atomically replace `path` with `content`
///
/// Returns the SHA-256 hash of the written content.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<String> {
    let expected = content_hash(content);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let parent = path.parent().unwrap_or(Path::new("."));
    let temp_file = tempfile::NamedTempFile::new_in(parent)?;
    let temp_path = temp_file.into_temp_path();

    fs::write(&temp_path, content)?;

    let written = file_hash(&temp_path)?;
    if expected != written {
        let _ = fs::remove_file(&temp_path);
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Hash mismatch after write: expected {}, got {}", expected, written),
        ));
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    Ok(expected)
}

/// Atomically replace `path` with a UTF-8 string
pub fn atomic_write_str(path: &Path, content: &str) -> io::Result<String> {
    atomic_write(path, content.as_bytes())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_content_hash_format() {
        let hash = content_hash(b"Test content");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

        // Deterministic, and distinct for distinct content
        assert_eq!(hash, content_hash(b"Test content"));
        assert_ne!(hash, content_hash(b"Different content"));
    }

    #[test]
    fn test_atomic_write_success() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.json");

        let content = b"{\"incomingMails\":[]}";
        let hash = atomic_write(&file_path, content).unwrap();

        assert_eq!(fs::read(&file_path).unwrap(), content);
        assert_eq!(hash, content_hash(content));
    }

    #[test]
    fn test_atomic_write_creates_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("deep/nested/test.json");

        atomic_write(&file_path, b"x").unwrap();
        assert!(file_path.exists());
    }

    #[test]
    fn test_atomic_write_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.json");

        fs::write(&file_path, b"old").unwrap();
        atomic_write(&file_path, b"new").unwrap();

        assert_eq!(fs::read(&file_path).unwrap(), b"new");
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.json");

        atomic_write_str(&file_path, "contenu").unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name().to_string_lossy(), "test.json");
    }
}
