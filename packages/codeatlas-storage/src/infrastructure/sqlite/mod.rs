//! SQLite adapter for `SnapshotStore`.
//!
//! Schema (two tables, no ORM):
//!
//! ```sql
//! CREATE TABLE snapshot_meta (
//!     id TEXT PRIMARY KEY,
//!     repo_id TEXT NOT NULL,
//!     schema_version INTEGER NOT NULL,
//!     integrity_hash TEXT NOT NULL,
//!     created_at_unix INTEGER NOT NULL
//! );
//! CREATE TABLE snapshot_entity (
//!     snapshot_id TEXT NOT NULL,
//!     entity_id TEXT NOT NULL,
//!     payload BLOB NOT NULL,
//!     PRIMARY KEY (snapshot_id, entity_id)
//! );
//! ```

use crate::domain::{SnapshotMeta, SnapshotStore};
use crate::error::{Result, StorageError};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS snapshot_meta (
    id TEXT PRIMARY KEY,
    repo_id TEXT NOT NULL,
    schema_version INTEGER NOT NULL,
    integrity_hash TEXT NOT NULL,
    created_at_unix INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS snapshot_entity (
    snapshot_id TEXT NOT NULL,
    entity_id TEXT NOT NULL,
    payload BLOB NOT NULL,
    PRIMARY KEY (snapshot_id, entity_id)
);
CREATE INDEX IF NOT EXISTS idx_snapshot_meta_repo ON snapshot_meta(repo_id);
";

/// A `SnapshotStore` backed by a single SQLite connection guarded by a
/// mutex. One process owns the store at a time — the pipeline's build
/// step is the only writer, so lock contention here is never on a hot
/// path (§5 "Shared resources").
pub struct SqliteSnapshotStore {
    conn: Mutex<Connection>,
}

impl SqliteSnapshotStore {
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn init(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn save_meta(&self, meta: &SnapshotMeta) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO snapshot_meta (id, repo_id, schema_version, integrity_hash, created_at_unix) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![meta.id, meta.repo_id, meta.schema_version, meta.integrity_hash, meta.created_at_unix as i64],
        )?;
        Ok(())
    }

    fn get_meta(&self, snapshot_id: &str) -> Result<SnapshotMeta> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, repo_id, schema_version, integrity_hash, created_at_unix FROM snapshot_meta WHERE id = ?1",
            params![snapshot_id],
            |row| {
                Ok(SnapshotMeta {
                    id: row.get(0)?,
                    repo_id: row.get(1)?,
                    schema_version: row.get(2)?,
                    integrity_hash: row.get(3)?,
                    created_at_unix: row.get::<_, i64>(4)? as u64,
                })
            },
        )
        .map_err(|err| match err {
            rusqlite::Error::QueryReturnedNoRows => StorageError::snapshot_not_found(snapshot_id),
            other => other.into(),
        })
    }

    fn list_snapshots(&self, repo_id: &str) -> Result<Vec<SnapshotMeta>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, repo_id, schema_version, integrity_hash, created_at_unix FROM snapshot_meta WHERE repo_id = ?1 ORDER BY created_at_unix",
        )?;
        let rows = stmt.query_map(params![repo_id], |row| {
            Ok(SnapshotMeta {
                id: row.get(0)?,
                repo_id: row.get(1)?,
                schema_version: row.get(2)?,
                integrity_hash: row.get(3)?,
                created_at_unix: row.get::<_, i64>(4)? as u64,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn save_entity(&self, snapshot_id: &str, entity_id: &str, payload: &[u8]) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO snapshot_entity (snapshot_id, entity_id, payload) VALUES (?1, ?2, ?3)",
            params![snapshot_id, entity_id, payload],
        )?;
        Ok(())
    }

    fn get_entity(&self, snapshot_id: &str, entity_id: &str) -> Result<Vec<u8>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT payload FROM snapshot_entity WHERE snapshot_id = ?1 AND entity_id = ?2",
            params![snapshot_id, entity_id],
            |row| row.get(0),
        )
        .map_err(|err| match err {
            rusqlite::Error::QueryReturnedNoRows => StorageError::entity_not_found(snapshot_id, entity_id),
            other => other.into(),
        })
    }

    fn list_entities(&self, snapshot_id: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT entity_id, payload FROM snapshot_entity WHERE snapshot_id = ?1")?;
        let rows = stmt.query_map(params![snapshot_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }
}
