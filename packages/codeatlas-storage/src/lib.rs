//! Content-addressed persistence for `codeatlas-ir` snapshots (§6).
//!
//! ## Core principles
//!
//! 1. **Immutability**: a snapshot never changes after it's saved; a
//!    rebuild produces a new `snapshot_id`.
//! 2. **Content-addressed identity**: `snapshot_id` is derived from the
//!    sorted per-file content hashes and the tool version, not from a
//!    VCS commit hash — the store has no notion of a repository's
//!    version-control history.
//! 3. **Entity-level addressing**: `(snapshot_id, entity_id)` keys every
//!    stored document, so a caller can fetch one file's IR without
//!    deserializing the whole snapshot.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use codeatlas_storage::{SnapshotStore, SnapshotMeta, infrastructure::SqliteSnapshotStore};
//!
//! let store = SqliteSnapshotStore::new_in_memory()?;
//! let meta = SnapshotMeta::new(snapshot_id, repo_id, integrity_hash);
//! store.save_meta(&meta)?;
//! store.save_document(&meta.id, &doc)?;
//! assert!(store.verify_integrity(&meta.id)?);
//! ```

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::{compute_integrity_hash, content_address, SnapshotMeta, SnapshotStore, SCHEMA_VERSION};
pub use error::{ErrorKind, Result, StorageError};
pub use infrastructure::SqliteSnapshotStore;
