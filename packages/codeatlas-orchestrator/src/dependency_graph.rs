//! Reverse dependency index and affected-file propagation (§4.7).
//!
//! `ReverseDependencyIndex` maps an imported file to the files that
//! import it, giving O(1) lookup for "who imports this"; `compute_affected_files`
//! does a BFS over that index to find the full transitive closure of a
//! change.

use dashmap::DashMap;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportKey {
    pub imported_file: PathBuf,
    pub symbol: String,
}

impl ImportKey {
    pub fn new(imported_file: PathBuf, symbol: String) -> Self {
        Self { imported_file, symbol }
    }

    pub fn wildcard(imported_file: PathBuf) -> Self {
        Self { imported_file, symbol: "*".to_string() }
    }
}

pub type FileId = PathBuf;

/// Maps `ImportKey` -> the files that hold that import, so "who imports
/// this file/symbol?" is a single map lookup rather than a scan.
pub struct ReverseDependencyIndex {
    reverse_deps: Arc<DashMap<ImportKey, Vec<FileId>>>,
}

impl ReverseDependencyIndex {
    pub fn new() -> Self {
        Self { reverse_deps: Arc::new(DashMap::new()) }
    }

    pub fn add_import(&self, from_file: FileId, imported_file: PathBuf, symbol: String) {
        let key = ImportKey::new(imported_file, symbol);
        self.reverse_deps.entry(key).or_insert_with(Vec::new).push(from_file);
    }

    pub fn add_wildcard_import(&self, from_file: FileId, imported_file: PathBuf) {
        let key = ImportKey::wildcard(imported_file);
        self.reverse_deps.entry(key).or_insert_with(Vec::new).push(from_file);
    }

    /// Every file that imports `file`, by wildcard or by named symbol.
    pub fn get_importers(&self, file: &Path) -> HashSet<FileId> {
        let mut importers = HashSet::new();
        let wildcard_key = ImportKey::wildcard(file.to_path_buf());
        if let Some(files) = self.reverse_deps.get(&wildcard_key) {
            importers.extend(files.iter().cloned());
        }
        for entry in self.reverse_deps.iter() {
            if entry.key().imported_file == file && entry.key().symbol != "*" {
                importers.extend(entry.value().iter().cloned());
            }
        }
        importers
    }

    pub fn clear(&self) {
        self.reverse_deps.clear();
    }

    pub fn len(&self) -> usize {
        self.reverse_deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reverse_deps.is_empty()
    }
}

impl Default for ReverseDependencyIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// BFS over the reverse dependency index: starting from `changed_files`,
/// repeatedly pulls in every importer of a file already in the affected
/// set until the frontier is empty. O(V+E) in the size of the affected
/// subgraph (§4.7 "Impact propagation").
pub fn compute_affected_files(changed_files: &HashSet<PathBuf>, reverse_deps: &ReverseDependencyIndex) -> HashSet<PathBuf> {
    let mut affected = HashSet::new();
    let mut queue = VecDeque::new();

    for file in changed_files {
        affected.insert(file.clone());
        queue.push_back(file.clone());
    }

    while let Some(current_file) = queue.pop_front() {
        for importer in reverse_deps.get_importers(&current_file) {
            if affected.insert(importer.clone()) {
                queue.push_back(importer);
            }
        }
    }

    affected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_dependency_index_basic() {
        let index = ReverseDependencyIndex::new();
        index.add_wildcard_import(PathBuf::from("A.py"), PathBuf::from("B.py"));
        let importers = index.get_importers(Path::new("B.py"));
        assert_eq!(importers.len(), 1);
        assert!(importers.contains(&PathBuf::from("A.py")));
    }

    #[test]
    fn reverse_dependency_multiple_importers() {
        let index = ReverseDependencyIndex::new();
        index.add_wildcard_import(PathBuf::from("A.py"), PathBuf::from("B.py"));
        index.add_wildcard_import(PathBuf::from("C.py"), PathBuf::from("B.py"));
        let importers = index.get_importers(Path::new("B.py"));
        assert_eq!(importers.len(), 2);
    }

    #[test]
    fn named_symbol_import_is_also_found() {
        let index = ReverseDependencyIndex::new();
        index.add_import(PathBuf::from("A.py"), PathBuf::from("B.py"), "helper".to_string());
        let importers = index.get_importers(Path::new("B.py"));
        assert!(importers.contains(&PathBuf::from("A.py")));
    }

    #[test]
    fn compute_affected_files_no_deps() {
        let index = ReverseDependencyIndex::new();
        let changed = HashSet::from([PathBuf::from("A.py")]);
        let affected = compute_affected_files(&changed, &index);
        assert_eq!(affected.len(), 1);
    }

    #[test]
    fn compute_affected_files_transitive_chain() {
        let index = ReverseDependencyIndex::new();
        index.add_wildcard_import(PathBuf::from("B.py"), PathBuf::from("A.py"));
        index.add_wildcard_import(PathBuf::from("C.py"), PathBuf::from("B.py"));
        let changed = HashSet::from([PathBuf::from("A.py")]);
        let affected = compute_affected_files(&changed, &index);
        assert_eq!(affected.len(), 3);
    }

    #[test]
    fn compute_affected_files_diamond() {
        let index = ReverseDependencyIndex::new();
        index.add_wildcard_import(PathBuf::from("B.py"), PathBuf::from("A.py"));
        index.add_wildcard_import(PathBuf::from("C.py"), PathBuf::from("A.py"));
        index.add_wildcard_import(PathBuf::from("D.py"), PathBuf::from("B.py"));
        index.add_wildcard_import(PathBuf::from("D.py"), PathBuf::from("C.py"));
        let changed = HashSet::from([PathBuf::from("A.py")]);
        let affected = compute_affected_files(&changed, &index);
        assert_eq!(affected.len(), 4);
    }

    #[test]
    fn reverse_index_clear() {
        let index = ReverseDependencyIndex::new();
        index.add_wildcard_import(PathBuf::from("A.py"), PathBuf::from("B.py"));
        index.clear();
        assert!(index.is_empty());
    }
}
