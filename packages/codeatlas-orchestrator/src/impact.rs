//! Impact analysis: combines per-symbol change classification
//! (`codeatlas_ir::model::SymbolHash`) with the reverse dependency graph
//! to decide exactly how much of a snapshot an incremental build needs
//! to touch (§4.7).

use crate::dependency_graph::{compute_affected_files, ReverseDependencyIndex};
use codeatlas_ir::model::{ImpactClass, SymbolHash};
use std::collections::HashSet;
use std::path::PathBuf;

/// The outcome of diffing one file's old and new `SymbolHash` sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileImpact {
    pub file_path: String,
    pub class: ImpactClass,
}

/// Diffs two symbol-hash snapshots of the same file and classifies the
/// impact as the worst (highest-invalidation) classification among its
/// symbols. A symbol present in `new` but absent from `old` (added) or
/// vice versa (removed) is always `StructuralChange` — the containing
/// file's structural IR changed shape.
pub fn classify_file_impact(file_path: &str, old: &[SymbolHash], new: &[SymbolHash]) -> FileImpact {
    use std::collections::HashMap;

    let old_by_id: HashMap<&str, &SymbolHash> = old.iter().map(|s| (s.symbol_id.as_str(), s)).collect();
    let new_by_id: HashMap<&str, &SymbolHash> = new.iter().map(|s| (s.symbol_id.as_str(), s)).collect();

    let mut worst = ImpactClass::NoImpact;

    for (id, new_hash) in &new_by_id {
        let class = match old_by_id.get(id) {
            Some(old_hash) => SymbolHash::classify_change(old_hash, new_hash),
            None => ImpactClass::StructuralChange,
        };
        worst = worst.max(class);
    }
    for id in old_by_id.keys() {
        if !new_by_id.contains_key(id) {
            worst = worst.max(ImpactClass::StructuralChange);
        }
    }

    FileImpact { file_path: file_path.to_string(), class: worst }
}

/// Expands a set of directly-changed files into the full rebuild set:
/// every directly changed file, plus every transitive importer of a
/// file whose impact is `SignatureChange` or `StructuralChange` — a
/// `LocalIR`-only change never needs to invalidate callers (§4.7).
pub fn expand_rebuild_set(impacts: &[FileImpact], reverse_deps: &ReverseDependencyIndex) -> HashSet<PathBuf> {
    let propagating: HashSet<PathBuf> = impacts
        .iter()
        .filter(|impact| impact.class >= ImpactClass::SignatureChange)
        .map(|impact| PathBuf::from(&impact.file_path))
        .collect();

    let mut rebuild_set = compute_affected_files(&propagating, reverse_deps);

    for impact in impacts {
        if impact.class != ImpactClass::NoImpact {
            rebuild_set.insert(PathBuf::from(&impact.file_path));
        }
    }

    rebuild_set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(id: &str, sig: &str, body: &str, impact: &str) -> SymbolHash {
        SymbolHash { symbol_id: id.into(), signature_hash: sig.into(), body_hash: body.into(), impact_hash: impact.into() }
    }

    #[test]
    fn unchanged_symbols_classify_as_no_impact() {
        let a = hash("s1", "sig", "body", "impact");
        let impact = classify_file_impact("a.py", &[a.clone()], &[a]);
        assert_eq!(impact.class, ImpactClass::NoImpact);
    }

    #[test]
    fn added_symbol_is_structural() {
        let old = vec![];
        let new = vec![hash("s1", "sig", "body", "impact")];
        let impact = classify_file_impact("a.py", &old, &new);
        assert_eq!(impact.class, ImpactClass::StructuralChange);
    }

    #[test]
    fn removed_symbol_is_structural() {
        let old = vec![hash("s1", "sig", "body", "impact")];
        let new = vec![];
        let impact = classify_file_impact("a.py", &old, &new);
        assert_eq!(impact.class, ImpactClass::StructuralChange);
    }

    #[test]
    fn worst_class_among_symbols_wins() {
        let old = vec![hash("s1", "sig", "body1", "impact"), hash("s2", "sig1", "body", "impact")];
        let new = vec![hash("s1", "sig", "body2", "impact"), hash("s2", "sig2", "body", "impact")];
        let impact = classify_file_impact("a.py", &old, &new);
        assert_eq!(impact.class, ImpactClass::SignatureChange);
    }

    #[test]
    fn local_change_does_not_propagate_to_importers() {
        let reverse_deps = ReverseDependencyIndex::new();
        reverse_deps.add_wildcard_import(PathBuf::from("caller.py"), PathBuf::from("a.py"));
        let impacts = vec![FileImpact { file_path: "a.py".into(), class: ImpactClass::LocalIR }];
        let rebuild_set = expand_rebuild_set(&impacts, &reverse_deps);
        assert!(rebuild_set.contains(&PathBuf::from("a.py")));
        assert!(!rebuild_set.contains(&PathBuf::from("caller.py")));
    }

    #[test]
    fn signature_change_propagates_to_importers() {
        let reverse_deps = ReverseDependencyIndex::new();
        reverse_deps.add_wildcard_import(PathBuf::from("caller.py"), PathBuf::from("a.py"));
        let impacts = vec![FileImpact { file_path: "a.py".into(), class: ImpactClass::SignatureChange }];
        let rebuild_set = expand_rebuild_set(&impacts, &reverse_deps);
        assert!(rebuild_set.contains(&PathBuf::from("caller.py")));
    }

    proptest::proptest! {
        /// Swapping a symbol's body text never produces a *less* invalid
        /// classification than leaving it untouched — classification is
        /// monotonic in how much of the hash triple differs.
        #[test]
        fn classification_is_monotonic_in_hash_divergence(
            sig_changed in proptest::bool::ANY,
            body_changed in proptest::bool::ANY,
            impact_changed in proptest::bool::ANY,
        ) {
            let old = hash("s1", "sig1", "body1", "impact1");
            let new = hash(
                "s1",
                if sig_changed { "sig2" } else { "sig1" },
                if body_changed { "body2" } else { "body1" },
                if impact_changed { "impact2" } else { "impact1" },
            );
            let impact = classify_file_impact("a.py", &[old], &[new]);
            if impact_changed {
                proptest::prop_assert_eq!(impact.class, ImpactClass::StructuralChange);
            } else if sig_changed {
                proptest::prop_assert_eq!(impact.class, ImpactClass::SignatureChange);
            } else if body_changed {
                proptest::prop_assert_eq!(impact.class, ImpactClass::LocalIR);
            } else {
                proptest::prop_assert_eq!(impact.class, ImpactClass::NoImpact);
            }
        }
    }
}
