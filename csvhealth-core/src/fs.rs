//! Filesystem abstractions used when selecting upload files.

use std::path::Path;

use crate::error::Result;

/// Abstraction over filesystem access for testability.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem {
    /// Size of the file in bytes, read from metadata without opening it.
    fn file_size(&self, path: &Path) -> Result<u64>;
    /// Read the whole file.
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Default filesystem implementation backed by `std::fs`.
#[derive(Debug, Default, Clone)]
pub struct StdFileSystem;

impl StdFileSystem {
    /// Create a new standard filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for StdFileSystem {
    fn file_size(&self, path: &Path) -> Result<u64> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(crate::CsvHealthError::Other(format!(
                "not a regular file: {}",
                path.display()
            )));
        }
        Ok(metadata.len())
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(std::fs::read(path)?)
    }
}
