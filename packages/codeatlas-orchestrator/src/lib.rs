//! Incremental pipeline and Mode Controller for the code-intelligence
//! core (§4.7, §4.8): impact analysis over `codeatlas_ir::model::SymbolHash`,
//! a reverse dependency graph for propagating changes to importers, a
//! rebuild cache that reuses unaffected IR across builds, and the four-mode
//! controller (Fast/Balanced/Deep/Repair) that decides how much of that
//! machinery a given external event actually needs.

pub mod dependency_graph;
pub mod error;
pub mod impact;
pub mod incremental;
pub mod modes;
pub mod rebuild_cache;

pub use dependency_graph::{compute_affected_files, FileId, ImportKey, ReverseDependencyIndex};
pub use error::{ErrorCategory, OrchestratorError, Result};
pub use impact::{classify_file_impact, expand_rebuild_set, FileImpact};
pub use incremental::{IncrementalPipeline, IncrementalResult, RepoFile};
pub use modes::{Event, Mode, ModeController};
pub use rebuild_cache::{ir_cache_key, CacheEntry, RebuildCache};
