//! `IRDocument` — the per-file container of nodes, edges, occurrences,
//! template slots, and diagnostics (§3).

use crate::diagnostics::Diagnostic;
use crate::model::edge::Edge;
use crate::model::node::Node;
use crate::model::occurrence::Occurrence;
use crate::model::template_slot::TemplateSlot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IRDocument {
    pub repo_id: String,
    pub snapshot_id: String,
    pub file_path: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub occurrences: Vec<Occurrence>,
    pub template_slots: Vec<TemplateSlot>,
    pub diagnostics: Vec<Diagnostic>,
}

impl IRDocument {
    pub fn empty(repo_id: impl Into<String>, snapshot_id: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            snapshot_id: snapshot_id.into(),
            file_path: file_path.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            occurrences: Vec::new(),
            template_slots: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.occurrences.is_empty()
    }

    /// Sorts nodes/edges/occurrences by span then kind, per the canonical
    /// emission order required for byte-identical serialization across
    /// worker counts (§5, §8 seed scenario "parallel determinism").
    pub fn canonicalize(&mut self) {
        self.nodes.sort_by(|a, b| a.span.sort_key().cmp(&b.span.sort_key()).then(a.kind.cmp(&b.kind)).then(a.id.cmp(&b.id)));
        self.edges.sort_by(|a, b| {
            a.span
                .map(|s| s.sort_key())
                .cmp(&b.span.map(|s| s.sort_key()))
                .then(a.kind.cmp(&b.kind))
                .then(a.id.cmp(&b.id))
        });
        self.occurrences.sort_by(|a, b| a.span.sort_key().cmp(&b.span.sort_key()));
    }

    /// Every edge endpoint must be a node that lives in *some* document of
    /// the same snapshot. Cross-file edges are allowed post-resolution, so
    /// this only validates endpoints local to this document; the full
    /// invariant is checked by the resolver once all documents of a
    /// snapshot are assembled.
    pub fn validate_local_edges(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for edge in &self.edges {
            let source_local = self.nodes.iter().any(|n| n.id == edge.source_id);
            let target_local = self.nodes.iter().any(|n| n.id == edge.target_id);
            if !source_local && !target_local {
                errors.push(format!(
                    "edge {} ({:?}) has neither endpoint in this document; cross-file resolution required",
                    edge.id, edge.kind
                ));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_has_no_diagnostics() {
        let doc = IRDocument::empty("repo", "snap1", "a.py");
        assert!(doc.is_empty());
        assert!(doc.diagnostics.is_empty());
    }
}
