//! High-level graft operations
//!
//! This module provides the workflows behind the mutating commands:
//! - `resolve`: full resolution of graft.yaml into graft.lock
//! - `apply`: re-pin one dependency, no commands run
//! - `upgrade`: snapshot, migrate, verify, re-pin, roll back on failure
//!
//! They coordinate with:
//! - Resolver: dependency resolution (from resolver module)
//! - Snapshot: rollback of the lock file (from snapshot module)
//! - Exec: migration and verification commands (from exec module)

pub mod apply;
pub mod context;
pub mod resolve;
pub mod upgrade;

pub use context::OperationContext;
pub use upgrade::{UpgradeOperation, UpgradeOptions};
