//! File system capability with unified error handling
//!
//! Everything that touches the lock file or snapshots goes through
//! [`FileSystem`], so tests can swap in an in-memory implementation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{self, Result};

/// Whole-file operations used by the lock store and snapshot manager
pub trait FileSystem {
    /// File contents, or `None` when the file does not exist
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>>;

    /// Replace the file so readers see either the old or the new bytes
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Delete the file; a missing file is not an error
    fn remove(&self, path: &Path) -> Result<()>;

    /// Files directly inside `dir`; empty when it does not exist
    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.read(path)?.is_some())
    }
}

/// Mode for a file written where none existed: `rw-r--r--`
#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

/// The real file system
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(error::file_read_failed(path, e)),
        }
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| error::file_write_failed(path, e))?;

        // Same directory as the target so the rename never crosses devices
        let mut temp =
            NamedTempFile::new_in(&parent).map_err(|e| error::file_write_failed(path, e))?;
        temp.write_all(contents)
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| error::file_write_failed(path, e))?;
        // Temp files are created owner-only; keep the target's mode instead
        let permissions = match fs::metadata(path) {
            Ok(meta) => Some(meta.permissions()),
            Err(_) => default_permissions(),
        };
        if let Some(permissions) = permissions {
            temp.as_file()
                .set_permissions(permissions)
                .map_err(|e| error::file_write_failed(path, e))?;
        }
        temp.persist(path)
            .map_err(|e| error::file_write_failed(path, e.error))?;
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(error::file_write_failed(path, e)),
        }
    }

    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(error::file_read_failed(dir, e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| error::file_read_failed(dir, e))?;
            if entry.file_type().is_ok_and(|ft| ft.is_file()) {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }
}
