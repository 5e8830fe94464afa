//! Incremental pipeline orchestration (§4.7): diffs a repository's
//! per-file content hashes against the last snapshot, expands the
//! change into a full rebuild set via impact analysis, rebuilds only
//! that set through `codeatlas_ir::Pipeline`, and persists the result
//! through a `codeatlas_storage::SnapshotStore`.

use crate::dependency_graph::ReverseDependencyIndex;
use crate::error::{OrchestratorError, Result};
use crate::impact::{classify_file_impact, expand_rebuild_set, FileImpact};
use crate::rebuild_cache::{ir_cache_key, CacheEntry, RebuildCache};
use codeatlas_ir::config::IncrementalConfig;
use codeatlas_ir::model::{EdgeKind, IRDocument, Node, NodeKind, SymbolHash};
use codeatlas_ir::taint::AtomRule;
use codeatlas_ir::{Pipeline, SourceFile};
use codeatlas_storage::{content_address, SnapshotMeta, SnapshotStore};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// One file as seen by the incremental planner: its path, content, and
/// content hash (the caller computes the hash; this crate never reads
/// the filesystem itself — §5 "Suspension points").
pub struct RepoFile {
    pub path: String,
    pub content: String,
    pub content_hash: String,
}

pub struct IncrementalResult {
    pub snapshot_id: String,
    pub changed_files: Vec<String>,
    pub rebuilt_files: Vec<String>,
    pub reused_from_cache: Vec<String>,
    pub documents: Vec<IRDocument>,
}

/// Ties the impact analyzer, reverse dependency graph, rebuild cache,
/// and `codeatlas_ir::Pipeline` together into one incremental build.
pub struct IncrementalPipeline {
    pipeline: Pipeline,
    store: Arc<dyn SnapshotStore>,
    cache: RebuildCache,
    reverse_deps: ReverseDependencyIndex,
    tool_version: String,
}

impl IncrementalPipeline {
    pub fn new(pipeline: Pipeline, store: Arc<dyn SnapshotStore>, tool_version: impl Into<String>) -> Self {
        Self::with_incremental_config(pipeline, store, tool_version, IncrementalConfig::default())
    }

    /// Like [`Self::new`], but builds the rebuild cache from the
    /// process's `incremental.*` settings (§6) instead of their
    /// defaults.
    pub fn with_incremental_config(
        pipeline: Pipeline,
        store: Arc<dyn SnapshotStore>,
        tool_version: impl Into<String>,
        incremental: IncrementalConfig,
    ) -> Self {
        Self {
            pipeline,
            store,
            cache: RebuildCache::from_config(&incremental),
            reverse_deps: ReverseDependencyIndex::new(),
            tool_version: tool_version.into(),
        }
    }

    /// Registers that `from_file` imports `imported_file` (wildcard),
    /// feeding the reverse dependency graph used for impact propagation.
    pub fn register_import(&self, from_file: &str, imported_file: &str) {
        self.reverse_deps.add_wildcard_import(PathBuf::from(from_file), PathBuf::from(imported_file));
    }

    /// §4.7 step 1: parses a file's current content into its IR and
    /// derives a fresh `SymbolHash` for every definition node, ready to
    /// feed `incremental_build`'s `symbol_hashes_before`/`_after` maps. The
    /// caller runs this once against the old content and once against the
    /// new content of each changed file.
    pub fn symbol_hashes(&self, path: &str, content: &str, rules: &[AtomRule]) -> Vec<SymbolHash> {
        let files = [SourceFile { path: path.to_string(), content: content.to_string() }];
        let build = self.pipeline.build("_symbol_hash_scratch", "_scratch", &files, rules);
        build.documents.first().map(|doc| symbol_hashes_for_document(doc, content)).unwrap_or_default()
    }

    /// Runs a full build when there is no prior snapshot to diff
    /// against — every file is "changed".
    pub fn full_build(&self, repo_id: &str, files: &[RepoFile], rules: &[AtomRule]) -> Result<IncrementalResult> {
        let hashes: Vec<String> = files.iter().map(|f| f.content_hash.clone()).collect();
        let snapshot_id = content_address(hashes, &self.tool_version);

        let source_files: Vec<SourceFile> = files.iter().map(|f| SourceFile { path: f.path.clone(), content: f.content.clone() }).collect();
        let build = self.pipeline.build(repo_id, &snapshot_id, &source_files, rules);

        self.persist(repo_id, &snapshot_id, &build.documents)?;

        let rebuilt_files: Vec<String> = files.iter().map(|f| f.path.clone()).collect();
        info!(repo_id, snapshot_id, rebuilt = rebuilt_files.len(), "full build complete");

        Ok(IncrementalResult { snapshot_id, changed_files: rebuilt_files.clone(), rebuilt_files, reused_from_cache: Vec::new(), documents: build.documents })
    }

    /// Runs an incremental build: `changed_files` names what the caller
    /// knows changed by content hash; `symbol_hashes_before`/`_after`
    /// are per-file symbol-hash sets used to classify exactly how far
    /// the change propagates (§4.7).
    pub fn incremental_build(
        &self,
        repo_id: &str,
        previous_snapshot_id: &str,
        all_files: &[RepoFile],
        changed_paths: &[String],
        symbol_hashes_before: &HashMap<String, Vec<SymbolHash>>,
        symbol_hashes_after: &HashMap<String, Vec<SymbolHash>>,
        rules: &[AtomRule],
    ) -> Result<IncrementalResult> {
        let previous_meta = self.store.get_meta(previous_snapshot_id).map_err(OrchestratorError::Storage)?;
        if !self.store.verify_integrity(previous_snapshot_id).map_err(OrchestratorError::Storage)? {
            return Err(OrchestratorError::SnapshotNotFound(format!(
                "snapshot {previous_snapshot_id} failed integrity verification; Repair mode required"
            )));
        }
        let _ = previous_meta;

        let impacts: Vec<FileImpact> = changed_paths
            .iter()
            .map(|path| {
                let before = symbol_hashes_before.get(path).map(Vec::as_slice).unwrap_or(&[]);
                let after = symbol_hashes_after.get(path).map(Vec::as_slice).unwrap_or(&[]);
                classify_file_impact(path, before, after)
            })
            .collect();

        let rebuild_set = expand_rebuild_set(&impacts, &self.reverse_deps);
        let rebuild_paths: std::collections::HashSet<String> = rebuild_set.iter().map(|p| p.to_string_lossy().to_string()).collect();

        let hashes: Vec<String> = all_files.iter().map(|f| f.content_hash.clone()).collect();
        let new_snapshot_id = content_address(hashes, &self.tool_version);

        let mut documents = Vec::new();
        let mut rebuilt_files = Vec::new();
        let mut reused_from_cache = Vec::new();
        let mut to_build = Vec::new();

        for file in all_files {
            if rebuild_paths.contains(&file.path) {
                to_build.push(SourceFile { path: file.path.clone(), content: file.content.clone() });
                rebuilt_files.push(file.path.clone());
            } else if let Some(cached) = self.cache.get(&ir_cache_key(repo_id, previous_snapshot_id, &file.path)) {
                if let Ok(doc) = serde_json::from_slice::<IRDocument>(&cached) {
                    documents.push(doc);
                    reused_from_cache.push(file.path.clone());
                    continue;
                }
                to_build.push(SourceFile { path: file.path.clone(), content: file.content.clone() });
                rebuilt_files.push(file.path.clone());
            } else if let Ok(doc) = self.store.get_document(previous_snapshot_id, &file.path) {
                documents.push(doc);
                reused_from_cache.push(file.path.clone());
            } else {
                to_build.push(SourceFile { path: file.path.clone(), content: file.content.clone() });
                rebuilt_files.push(file.path.clone());
            }
        }

        if !to_build.is_empty() {
            let build = self.pipeline.build(repo_id, &new_snapshot_id, &to_build, rules);
            documents.extend(build.documents);
        }

        for doc in &documents {
            let key = ir_cache_key(repo_id, &new_snapshot_id, &doc.file_path);
            if let Ok(payload) = serde_json::to_vec(doc) {
                self.cache.put(CacheEntry::new(repo_id, key, payload));
            }
        }
        self.cache.enforce_fair_quota(10);

        self.persist(repo_id, &new_snapshot_id, &documents)?;

        info!(
            repo_id,
            snapshot_id = new_snapshot_id,
            rebuilt = rebuilt_files.len(),
            reused = reused_from_cache.len(),
            "incremental build complete"
        );

        Ok(IncrementalResult { snapshot_id: new_snapshot_id, changed_files: changed_paths.to_vec(), rebuilt_files, reused_from_cache, documents })
    }

    fn persist(&self, repo_id: &str, snapshot_id: &str, documents: &[IRDocument]) -> Result<()> {
        let mut entities = Vec::new();
        for doc in documents {
            let payload = serde_json::to_vec(doc).map_err(OrchestratorError::serialization)?;
            entities.push((doc.file_path.clone(), payload));
            self.store.save_document(snapshot_id, doc).map_err(OrchestratorError::Storage)?;
        }
        let integrity_hash = codeatlas_storage::compute_integrity_hash(&entities);
        let meta = SnapshotMeta::new(snapshot_id, repo_id, integrity_hash);
        self.store.save_meta(&meta).map_err(OrchestratorError::Storage)?;
        Ok(())
    }
}

/// Derives one `SymbolHash` per definition node (module/class/function/
/// method/variable/constant) in `doc`, its direct structural children
/// being whatever a `Contains` edge points at from that node.
fn symbol_hashes_for_document(doc: &IRDocument, source: &str) -> Vec<SymbolHash> {
    let mut children_by_parent: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &doc.edges {
        if edge.kind == EdgeKind::Contains {
            children_by_parent.entry(edge.source_id.as_str()).or_default().push(edge.target_id.as_str());
        }
    }
    let nodes_by_id: HashMap<&str, &Node> = doc.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    doc.nodes
        .iter()
        .filter(|n| {
            matches!(
                n.kind,
                NodeKind::Module | NodeKind::Class | NodeKind::Function | NodeKind::Method | NodeKind::Variable | NodeKind::Constant
            )
        })
        .map(|node| {
            let children: Vec<&Node> = children_by_parent
                .get(node.id.as_str())
                .map(|ids| ids.iter().filter_map(|id| nodes_by_id.get(id).copied()).collect())
                .unwrap_or_default();
            SymbolHash::compute(node, source, &children)
        })
        .collect()
}
