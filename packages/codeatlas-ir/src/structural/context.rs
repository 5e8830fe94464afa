//! Shared extraction context: scope stack for FQN construction, content-hash
//! ID derivation, and accumulation of nodes/edges/occurrences/diagnostics
//! for one file (§4.2).

use crate::diagnostics::Diagnostic;
use crate::model::id::content_id;
use crate::model::{Edge, EdgeKind, IRDocument, Language, Node, NodeKind, Occurrence, OccurrenceRole, TemplateSlot};
use crate::parser_registry::Cst;
use crate::span::Span;

pub struct GeneratorContext<'a> {
    pub cst: &'a Cst,
    pub repo_id: String,
    pub snapshot_id: String,
    pub file_path: String,
    pub language: Language,
    pub scope_stack: Vec<String>,
    pub parent_id: Option<String>,
    pub doc: IRDocument,
    /// Local-name → node ID of whatever most recently produced that name's
    /// value (a call/read expression or the variable it was bound to).
    /// Cleared on function entry — a best-effort local dataflow map, not a
    /// real scope resolver; cross-function chains go through the resolver.
    value_sources: std::collections::HashMap<String, String>,
}

impl<'a> GeneratorContext<'a> {
    pub fn new(cst: &'a Cst, repo_id: &str, snapshot_id: &str, file_path: &str) -> Self {
        let doc = IRDocument::empty(repo_id, snapshot_id, file_path);
        Self {
            cst,
            repo_id: repo_id.to_string(),
            snapshot_id: snapshot_id.to_string(),
            file_path: file_path.to_string(),
            language: cst.language,
            scope_stack: Vec::new(),
            parent_id: None,
            doc,
            value_sources: std::collections::HashMap::new(),
        }
    }

    pub fn fqn_prefix(&self) -> String {
        self.scope_stack.join(".")
    }

    pub fn fqn(&self, name: &str) -> String {
        let prefix = self.fqn_prefix();
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        }
    }

    pub fn push_scope(&mut self, name: &str) {
        self.scope_stack.push(name.to_string());
    }

    pub fn pop_scope(&mut self) {
        self.scope_stack.pop();
    }

    /// Content-addressed node ID: hash of kind + fqn + span + file path.
    /// Never includes attrs, so attaching a docstring or decorator doesn't
    /// change identity (§4.2 "stable IDs").
    pub fn node_id(&self, kind: NodeKind, fqn: &str, span: Span) -> String {
        content_id(&[
            &format!("{kind:?}"),
            fqn,
            &format!("{:?}", span.sort_key()),
            &self.file_path,
        ])
    }

    pub fn edge_id(&self, kind: EdgeKind, source_id: &str, target_id: &str) -> String {
        content_id(&[kind.as_str(), source_id, target_id])
    }

    pub fn add_node(&mut self, node: Node) {
        self.doc.nodes.push(node);
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.doc.edges.push(edge);
    }

    pub fn add_occurrence(&mut self, occurrence: Occurrence) {
        self.doc.occurrences.push(occurrence);
    }

    pub fn add_template_slot(&mut self, slot: TemplateSlot) {
        self.doc.template_slots.push(slot);
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.doc.diagnostics.push(diagnostic);
    }

    pub fn emit_contains(&mut self, child_id: &str) {
        if let Some(parent_id) = self.parent_id.clone() {
            let id = self.edge_id(EdgeKind::Contains, &parent_id, child_id);
            self.add_edge(Edge::new(id, EdgeKind::Contains, parent_id, child_id.to_string()));
        }
    }

    pub fn record_definition(&mut self, fqn: &str, node_id: &str, span: Span) {
        self.add_occurrence(
            Occurrence::new(fqn, self.file_path.clone(), span, OccurrenceRole::Definition).with_node(node_id),
        );
    }

    pub fn record_reference(&mut self, fqn: &str, span: Span) {
        self.add_occurrence(Occurrence::new(fqn, self.file_path.clone(), span, OccurrenceRole::Reference));
    }

    /// Run `body` with `parent_id` set to `node_id` and `name` pushed onto
    /// the scope stack, restoring both afterward. Mirrors the recursive
    /// push/pop-scope pattern used across all three language generators.
    pub fn within_scope(&mut self, node_id: &str, name: &str, body: impl FnOnce(&mut Self)) {
        let old_parent = self.parent_id.take();
        self.parent_id = Some(node_id.to_string());
        self.push_scope(name);
        body(self);
        self.pop_scope();
        self.parent_id = old_parent;
    }

    /// Records that `name`'s current value flows from `node_id` (a call,
    /// read, or assign expression, or the variable/parameter node itself).
    pub fn bind_value(&mut self, name: &str, node_id: &str) {
        self.value_sources.insert(name.to_string(), node_id.to_string());
    }

    pub fn lookup_value(&self, name: &str) -> Option<String> {
        self.value_sources.get(name).cloned()
    }

    /// Drops every locally-tracked binding — called on function entry so a
    /// parameter or local in one function never chains into another's body.
    pub fn clear_local_values(&mut self) {
        self.value_sources.clear();
    }

    pub fn finish(mut self) -> IRDocument {
        self.doc.canonicalize();
        self.doc
    }
}
