//! Reading and writing graft.lock through the file system capability

use std::path::{Path, PathBuf};

use crate::common::fs::FileSystem;
use crate::config::lockfile::LockFile;
use crate::error::{GraftError, Result};

/// The lock file at a fixed path
pub struct LockStore<'a> {
    fs: &'a dyn FileSystem,
    path: PathBuf,
}

impl<'a> LockStore<'a> {
    pub fn new(fs: &'a dyn FileSystem, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw bytes, `None` when there is no lock file yet
    pub fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        self.fs.read(&self.path)
    }

    /// Parsed lock file, `None` when there is no lock file yet
    pub fn load(&self) -> Result<Option<LockFile>> {
        let Some(bytes) = self.read_bytes()? else {
            return Ok(None);
        };
        let path = self.path.display().to_string();
        let yaml = String::from_utf8(bytes)
            .map_err(|e| crate::error::schema(&path, format!("not valid UTF-8: {e}")))?;
        LockFile::from_yaml(&yaml, &path).map(Some)
    }

    /// Parsed lock file; a missing file is an error
    pub fn load_required(&self) -> Result<LockFile> {
        self.load()?.ok_or_else(|| GraftError::LockfileMissing {
            path: self.path.display().to_string(),
        })
    }

    /// Serialize and atomically replace the lock file
    pub fn save(&self, lockfile: &LockFile) -> Result<()> {
        let yaml = lockfile.to_yaml()?;
        tracing::debug!(
            path = %self.path.display(),
            entries = lockfile.dependencies.len(),
            "writing lock file"
        );
        self.fs.write_atomic(&self.path, yaml.as_bytes())
    }
}
