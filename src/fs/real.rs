use super::FileSystem;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context(format!("Failed to read file {:?}", path))
    }

    fn write_atomic(&self, path: &Path, contents: &[u8], mode: u32) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // Same directory as the target so the rename never crosses filesystems.
        let mut tmp = NamedTempFile::new_in(dir)
            .context(format!("Failed to create temporary file in {:?}", dir))?;
        tmp.write_all(contents)
            .context(format!("Failed to write temporary file for {:?}", path))?;
        tmp.as_file()
            .sync_all()
            .context(format!("Failed to sync temporary file for {:?}", path))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(mode))
                .context(format!("Failed to set permissions on {:?}", tmp.path()))?;
        }
        #[cfg(not(unix))]
        let _ = mode;

        tmp.persist(path)
            .map_err(|e| e.error)
            .context(format!("Failed to move temporary file into {:?}", path))?;
        Ok(())
    }
}
