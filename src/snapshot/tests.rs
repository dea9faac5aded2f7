//! Tests for lock file snapshots

use super::*;

use crate::test_fixtures::MemoryFs;

const LOCK: &str = "/repo/graft.lock";
const DIR: &str = "/repo/.graft/.snapshots";

fn manager(fs: &MemoryFs) -> SnapshotManager<'_> {
    SnapshotManager::new(fs, LOCK, DIR)
}

fn lock_bytes(fs: &MemoryFs) -> Option<Vec<u8>> {
    fs.read(Path::new(LOCK)).unwrap()
}

#[test]
fn test_restore_puts_original_bytes_back() {
    let fs = MemoryFs::new();
    fs.insert(LOCK, "original: true\n");
    let snapshots = manager(&fs);

    let id = snapshots.create("upgrade").unwrap();
    fs.insert(LOCK, "changed: true\n");
    snapshots.restore(&id).unwrap();

    assert_eq!(lock_bytes(&fs).unwrap(), b"original: true\n");
}

#[test]
fn test_id_names_the_operation() {
    let fs = MemoryFs::new();
    fs.insert(LOCK, "x");
    let id = manager(&fs).create("upgrade").unwrap();
    assert!(id.starts_with("upgrade-"));
    assert!(id.ends_with('Z'));
}

#[test]
fn test_snapshot_without_lock_restores_absence() {
    let fs = MemoryFs::new();
    let snapshots = manager(&fs);

    let id = snapshots.create("apply").unwrap();
    assert!(!snapshots.get(&id).unwrap().unwrap().had_lock);

    fs.insert(LOCK, "created later\n");
    snapshots.restore(&id).unwrap();
    assert!(lock_bytes(&fs).is_none());
}

#[test]
fn test_restore_unknown_id_is_error() {
    let fs = MemoryFs::new();
    let err = manager(&fs).restore("upgrade-missing").unwrap_err();
    assert!(matches!(err, GraftError::SnapshotNotFound { .. }));
}

#[test]
fn test_corrupted_payload_is_not_restored() {
    let fs = MemoryFs::new();
    fs.insert(LOCK, "original\n");
    let snapshots = manager(&fs);
    let id = snapshots.create("upgrade").unwrap();

    fs.insert(format!("{DIR}/{id}.lock"), "tampered\n");
    fs.insert(LOCK, "current\n");

    let err = snapshots.restore(&id).unwrap_err();
    assert!(matches!(err, GraftError::SnapshotFailed { .. }));
    assert_eq!(lock_bytes(&fs).unwrap(), b"current\n");
}

#[test]
fn test_cleanup_removes_everything_and_is_idempotent() {
    let fs = MemoryFs::new();
    fs.insert(LOCK, "x");
    let snapshots = manager(&fs);
    let id = snapshots.create("upgrade").unwrap();

    snapshots.cleanup(&id).unwrap();
    snapshots.cleanup(&id).unwrap();

    assert!(snapshots.list().unwrap().is_empty());
    assert_eq!(fs.paths(), vec![PathBuf::from(LOCK)]);
}

#[test]
fn test_list_is_ordered_and_ids_are_unique() {
    let fs = MemoryFs::new();
    fs.insert(LOCK, "x");
    let snapshots = manager(&fs);

    let first = snapshots.create("upgrade").unwrap();
    let second = snapshots.create("upgrade").unwrap();
    assert_ne!(first, second);

    let ids: Vec<String> = snapshots.list().unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![first, second]);
}
