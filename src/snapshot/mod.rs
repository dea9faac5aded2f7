//! Lock file snapshots for rollback
//!
//! A snapshot captures the lock file bytes before a mutating operation so
//! a failed upgrade can put them back verbatim. Only the lock file is
//! captured: dependency checkouts are owned by git and user files by the
//! user.
//!
//! ## Layout
//!
//! ```text
//! .graft/.snapshots/
//! ├── upgrade-20260115T090000123456Z.lock   # payload (absent when there was no lock)
//! └── upgrade-20260115T090000123456Z.json   # metadata
//! ```

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::fs::FileSystem;
use crate::error::{GraftError, Result};
use crate::hash;

const PAYLOAD_EXT: &str = "lock";
const META_EXT: &str = "json";

/// Metadata of a captured snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,

    /// Operation that requested the snapshot
    pub operation: String,

    pub captured_at: DateTime<Utc>,

    /// Whether a lock file existed when the snapshot was taken
    pub had_lock: bool,

    /// BLAKE3 checksum of the payload, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// Creates, restores and removes snapshots of one lock file
pub struct SnapshotManager<'a> {
    fs: &'a dyn FileSystem,
    lock_path: PathBuf,
    dir: PathBuf,
}

impl<'a> SnapshotManager<'a> {
    pub fn new(fs: &'a dyn FileSystem, lock_path: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            lock_path: lock_path.into(),
            dir: dir.into(),
        }
    }

    fn payload_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{PAYLOAD_EXT}"))
    }

    fn meta_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{META_EXT}"))
    }

    /// Unused id derived from the operation and the capture time
    fn next_id(&self, operation: &str, captured_at: &DateTime<Utc>) -> Result<String> {
        let base = format!("{operation}-{}", captured_at.format("%Y%m%dT%H%M%S%6fZ"));
        let mut id = base.clone();
        let mut n = 1;
        while self.fs.exists(&self.meta_path(&id))? {
            n += 1;
            id = format!("{base}-{n}");
        }
        Ok(id)
    }

    /// Capture the current lock file; works when there is none yet
    pub fn create(&self, operation: &str) -> Result<String> {
        let captured_at = Utc::now();
        let id = self.next_id(operation, &captured_at)?;
        let payload = self.fs.read(&self.lock_path)?;

        let fail = |reason: String| GraftError::SnapshotFailed {
            id: id.clone(),
            reason,
        };

        if let Some(bytes) = &payload {
            self.fs
                .write_atomic(&self.payload_path(&id), bytes)
                .map_err(|e| fail(e.to_string()))?;
        }

        let snapshot = Snapshot {
            id: id.clone(),
            operation: operation.to_string(),
            captured_at,
            had_lock: payload.is_some(),
            checksum: payload.as_deref().map(hash::hash_bytes),
        };
        let meta = serde_json::to_vec_pretty(&snapshot).map_err(|e| fail(e.to_string()))?;
        self.fs
            .write_atomic(&self.meta_path(&id), &meta)
            .map_err(|e| fail(e.to_string()))?;

        tracing::debug!(id = %id, had_lock = snapshot.had_lock, "snapshot created");
        Ok(id)
    }

    /// Metadata for `id`, `None` when no such snapshot exists
    pub fn get(&self, id: &str) -> Result<Option<Snapshot>> {
        let Some(bytes) = self.fs.read(&self.meta_path(id))? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| GraftError::SnapshotFailed {
                id: id.to_string(),
                reason: format!("unreadable metadata: {e}"),
            })
    }

    /// Put the captured lock file back; an unknown id is an error
    pub fn restore(&self, id: &str) -> Result<()> {
        let snapshot = self.get(id)?.ok_or_else(|| GraftError::SnapshotNotFound {
            id: id.to_string(),
        })?;

        if !snapshot.had_lock {
            tracing::debug!(id, "restoring absent lock file");
            return self.fs.remove(&self.lock_path);
        }

        let fail = |reason: &str| GraftError::SnapshotFailed {
            id: id.to_string(),
            reason: reason.to_string(),
        };
        let payload = self
            .fs
            .read(&self.payload_path(id))?
            .ok_or_else(|| fail("payload is missing"))?;
        let intact = snapshot
            .checksum
            .as_deref()
            .is_some_and(|expected| hash::verify(expected, &payload));
        if !intact {
            return Err(fail("payload does not match its checksum"));
        }

        self.fs.write_atomic(&self.lock_path, &payload)?;
        tracing::debug!(id, "snapshot restored");
        Ok(())
    }

    /// Delete a snapshot; unknown ids are ignored
    pub fn cleanup(&self, id: &str) -> Result<()> {
        self.fs.remove(&self.payload_path(id))?;
        self.fs.remove(&self.meta_path(id))?;
        tracing::debug!(id, "snapshot removed");
        Ok(())
    }

    /// Retained snapshots, oldest first
    pub fn list(&self) -> Result<Vec<Snapshot>> {
        let mut snapshots = Vec::new();
        for path in self.fs.list(&self.dir)? {
            if path.extension().and_then(|e| e.to_str()) != Some(META_EXT) {
                continue;
            }
            let Some(id) = file_stem(&path) else {
                continue;
            };
            match self.get(&id) {
                Ok(Some(snapshot)) => snapshots.push(snapshot),
                Ok(None) => {}
                Err(e) => tracing::warn!(path = %path.display(), "skipping snapshot: {e}"),
            }
        }
        snapshots.sort_by(|a, b| {
            a.captured_at
                .cmp(&b.captured_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(snapshots)
    }
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}
