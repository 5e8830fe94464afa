//! Storage backend adapters.

pub mod sqlite;

pub use sqlite::SqliteSnapshotStore;
