//! Utility functions for glosor.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Result, VocabError};

/// Maximum size of an authoring file read into memory (1 MB).
pub const MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Read a file into a string, refusing files over `MAX_FILE_SIZE`.
pub fn read_to_string_limited(path: &Path) -> Result<String> {
    read_to_string_with_limit(path, MAX_FILE_SIZE)
}

/// Read a file into a string with a custom size limit.
///
/// # Errors
///
/// Returns an error if the file exceeds `max_size` or cannot be read.
pub fn read_to_string_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| VocabError::storage(path, e))?;

    let size = metadata.len();
    if size > max_size {
        return Err(VocabError::storage(
            path,
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("file is too large ({} bytes, max {} bytes)", size, max_size),
            ),
        ));
    }

    fs::read_to_string(path).map_err(|e| VocabError::storage(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_read_to_string_limited_success() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("words.toml");
        fs::write(&path, "part_of_speech_id = 1").unwrap();

        let content = read_to_string_limited(&path).unwrap();
        assert_eq!(content, "part_of_speech_id = 1");
    }

    #[test]
    fn test_read_to_string_limited_nonexistent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");

        let result = read_to_string_limited(&path);
        assert!(matches!(result, Err(VocabError::Storage { .. })));
    }

    #[test]
    fn test_read_to_string_with_limit_exceeds() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("large.toml");

        let mut file = fs::File::create(&path).unwrap();
        file.write_all(&[b'x'; 1000]).unwrap();

        let err = read_to_string_with_limit(&path, 500).unwrap_err().to_string();
        assert!(err.contains("too large"));
        assert!(err.contains("1000 bytes"));
        assert!(err.contains("max 500 bytes"));
    }

    #[test]
    fn test_read_to_string_limited_at_boundary() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("boundary.toml");
        fs::write(&path, "x".repeat(100)).unwrap();

        assert!(read_to_string_with_limit(&path, 100).is_ok());
        assert!(read_to_string_with_limit(&path, 99).is_err());
    }
}
