//! Domain layer for the snapshot store (§6 "Snapshot persistence").
//!
//! # Core Principles
//!
//! 1. **Immutability**: a snapshot, once saved, never changes. A new
//!    build produces a new `snapshot_id`.
//! 2. **Content-addressed identity**: `snapshot_id` is derived from the
//!    sorted per-file content hashes plus the tool version, so two
//!    builds of identical inputs get the same id regardless of build
//!    order.
//! 3. **Entity-level addressing**: the store is keyed by
//!    `(snapshot_id, entity_id)`, not just by file, so a caller can fetch
//!    one document without deserializing an entire snapshot.

use crate::Result;
use codeatlas_ir::model::IRDocument;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

/// Bumped whenever the on-disk schema changes incompatibly. A version
/// mismatch against a persisted snapshot's `schema_version` at open time
/// triggers Repair mode (§7 "Snapshot integrity mismatch").
pub const SCHEMA_VERSION: u32 = 1;

/// Derives a content-addressed snapshot id from the sorted per-file
/// content hashes and the tool version. Sorting first means file
/// processing order never affects the id (§5 "Ordering guarantees").
pub fn content_address(mut file_hashes: Vec<String>, tool_version: &str) -> String {
    file_hashes.sort();
    let mut hasher = Sha256::new();
    for hash in &file_hashes {
        hasher.update(hash.as_bytes());
        hasher.update(b"\0");
    }
    hasher.update(tool_version.as_bytes());
    format!("{:x}", hasher.finalize())[..16].to_string()
}

/// Persisted alongside a snapshot's entities: enough to verify integrity
/// and schema compatibility without touching the entity payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub id: String,
    pub repo_id: String,
    pub schema_version: u32,
    /// Hash over every stored entity payload, recomputed on open and
    /// compared against this value.
    pub integrity_hash: String,
    pub created_at_unix: u64,
}

impl SnapshotMeta {
    pub fn new(id: impl Into<String>, repo_id: impl Into<String>, integrity_hash: impl Into<String>) -> Self {
        let created_at_unix = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
        Self { id: id.into(), repo_id: repo_id.into(), schema_version: SCHEMA_VERSION, integrity_hash: integrity_hash.into(), created_at_unix }
    }

    pub fn is_current_schema(&self) -> bool {
        self.schema_version == SCHEMA_VERSION
    }
}

/// Computes the integrity hash of a snapshot from its `(entity_id,
/// payload)` pairs. Order-independent: callers may pass entities in any
/// order and get the same hash.
pub fn compute_integrity_hash(entities: &[(String, Vec<u8>)]) -> String {
    let mut sorted: Vec<&(String, Vec<u8>)> = entities.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    let mut hasher = Sha256::new();
    for (id, payload) in sorted {
        hasher.update(id.as_bytes());
        hasher.update(payload);
    }
    format!("{:x}", hasher.finalize())
}

/// Storage abstraction over a content-addressed, entity-keyed snapshot
/// store. Implementations (SQLite today) need only satisfy this trait;
/// nothing above it assumes a particular backend. Synchronous: the
/// pipeline's only suspension points are file reads done by the caller
/// before `Pipeline::build` runs (§5 "Suspension points"), so the store
/// itself never needs to yield.
pub trait SnapshotStore: Send + Sync {
    fn save_meta(&self, meta: &SnapshotMeta) -> Result<()>;
    fn get_meta(&self, snapshot_id: &str) -> Result<SnapshotMeta>;
    fn list_snapshots(&self, repo_id: &str) -> Result<Vec<SnapshotMeta>>;

    fn save_entity(&self, snapshot_id: &str, entity_id: &str, payload: &[u8]) -> Result<()>;
    fn get_entity(&self, snapshot_id: &str, entity_id: &str) -> Result<Vec<u8>>;
    fn list_entities(&self, snapshot_id: &str) -> Result<Vec<(String, Vec<u8>)>>;

    /// Serializes an `IRDocument` and stores it keyed by its file path.
    fn save_document(&self, snapshot_id: &str, doc: &IRDocument) -> Result<()> {
        let payload = serde_json::to_vec(doc)?;
        self.save_entity(snapshot_id, &doc.file_path, &payload)
    }

    fn get_document(&self, snapshot_id: &str, file_path: &str) -> Result<IRDocument> {
        let payload = self.get_entity(snapshot_id, file_path)?;
        Ok(serde_json::from_slice(&payload)?)
    }

    /// Recomputes the integrity hash over every stored entity and
    /// compares it against the persisted metadata. `false` (not an
    /// error) is the Repair-mode trigger, not `verify_integrity` itself
    /// erroring (§7).
    fn verify_integrity(&self, snapshot_id: &str) -> Result<bool> {
        let meta = self.get_meta(snapshot_id)?;
        let entities = self.list_entities(snapshot_id)?;
        Ok(meta.is_current_schema() && compute_integrity_hash(&entities) == meta.integrity_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_address_is_independent_of_input_order() {
        let forward = content_address(vec!["a".into(), "b".into(), "c".into()], "1.0.0");
        let reversed = content_address(vec!["c".into(), "b".into(), "a".into()], "1.0.0");
        assert_eq!(forward, reversed);
    }

    #[test]
    fn content_address_changes_with_tool_version() {
        let files = vec!["a".to_string()];
        let v1 = content_address(files.clone(), "1.0.0");
        let v2 = content_address(files, "1.0.1");
        assert_ne!(v1, v2);
    }

    #[test]
    fn integrity_hash_is_independent_of_entity_order() {
        let a = vec![("n1".to_string(), b"x".to_vec()), ("n2".to_string(), b"y".to_vec())];
        let b = vec![("n2".to_string(), b"y".to_vec()), ("n1".to_string(), b"x".to_vec())];
        assert_eq!(compute_integrity_hash(&a), compute_integrity_hash(&b));
    }

    #[test]
    fn schema_mismatch_is_detected() {
        let meta = SnapshotMeta { schema_version: SCHEMA_VERSION + 1, ..SnapshotMeta::new("s1", "repo", "hash") };
        assert!(!meta.is_current_schema());
    }
}
