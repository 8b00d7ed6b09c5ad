//! FileSystem trait definition

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
}

/// Abstraction over the project tree for testability
///
/// Adapter selection only ever reads from the tree; the single write is the
/// dispatcher config, which goes through [`FileSystem::write_atomic`].
pub trait FileSystem: Send + Sync {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace `path` with `contents` so readers never observe a partial file.
    ///
    /// `mode` is applied on Unix before the file becomes visible.
    fn write_atomic(&self, path: &Path, contents: &[u8], mode: u32) -> Result<()>;

    /// Join paths
    fn join(&self, base: &Path, path: &str) -> PathBuf {
        base.join(path)
    }
}
