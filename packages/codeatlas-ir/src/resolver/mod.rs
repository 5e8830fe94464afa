//! Cross-file Resolver (§4.3): builds a process-wide symbol table over all
//! files of a snapshot, then resolves unresolved references using
//! language-specific rules. Emits `References`/`Calls` edges to
//! definitions; unresolved references remain unresolved — no silent
//! guessing.

pub mod go;
pub mod python;
pub mod symbol_table;
pub mod typescript;

pub use symbol_table::SymbolTable;

use crate::diagnostics::Diagnostic;
use crate::model::{Edge, EdgeKind, IRDocument, Language, NodeKind, Occurrence, OccurrenceRole, Symbol, SymbolKind};
use crate::model::id::content_id;

fn symbol_kind_for(node_kind: NodeKind) -> Option<SymbolKind> {
    match node_kind {
        NodeKind::Module => Some(SymbolKind::Module),
        NodeKind::Class => Some(SymbolKind::Class),
        NodeKind::Function => Some(SymbolKind::Function),
        NodeKind::Method => Some(SymbolKind::Method),
        NodeKind::Variable => Some(SymbolKind::Variable),
        NodeKind::Constant => Some(SymbolKind::Constant),
        _ => None,
    }
}

/// Phase 1: collect every definition across `docs` into one symbol table,
/// reporting FQN collisions as diagnostics on the losing document.
pub fn build_symbol_table(docs: &mut [IRDocument]) -> SymbolTable {
    let table = SymbolTable::new();
    for doc in docs.iter() {
        for node in &doc.nodes {
            let Some(kind) = symbol_kind_for(node.kind) else { continue };
            if node.fqn.is_empty() {
                continue;
            }
            let symbol = Symbol::new(node.fqn.clone(), doc.file_path.clone(), node.span, kind);
            if let Some(diagnostic) = table.insert(symbol) {
                attach_diagnostic(docs, &diagnostic);
            }
        }
        match doc.language_hint() {
            Some(Language::Python) => python::register_imports(&table, &doc.file_path, &doc.nodes),
            Some(Language::TypeScript) | Some(Language::JavaScript) => {
                typescript::register_imports(&table, &doc.file_path, &doc.nodes)
            }
            Some(Language::Go) => go::register_imports(&table, &doc.file_path, &doc.nodes),
            None => {}
        }
    }
    table
}

fn attach_diagnostic(docs: &mut [IRDocument], diagnostic: &Diagnostic) {
    if let Some(doc) = docs.iter_mut().find(|d| d.file_path == diagnostic.file_path) {
        doc.diagnostics.push(diagnostic.clone());
    }
}

/// Phase 2: for every `Reference` occurrence not already backed by a local
/// definition, resolve it against `table` and emit a `References` edge
/// (and a `Calls` edge when the occurrence's span coincides with a call
/// expression — approximated here by presence in `call_sites`).
pub fn resolve_references(docs: &mut [IRDocument], table: &SymbolTable) {
    for doc in docs.iter_mut() {
        let language = doc.language_hint();
        let module_fqn = doc
            .nodes
            .iter()
            .find(|n| n.kind == NodeKind::Module)
            .map(|n| n.fqn.clone())
            .unwrap_or_default();
        let package_name = module_fqn.clone();

        let local_definitions: std::collections::HashSet<&str> = doc
            .occurrences
            .iter()
            .filter(|o| o.is_definition())
            .map(|o| o.symbol_fqn.as_str())
            .collect();

        let mut new_edges = Vec::new();
        for occ in &doc.occurrences {
            if !matches!(occ.role, OccurrenceRole::Reference) || local_definitions.contains(occ.symbol_fqn.as_str()) {
                continue;
            }
            let resolved = match language {
                Some(Language::Python) => python::resolve_reference(table, &doc.file_path, &module_fqn, &occ.symbol_fqn),
                Some(Language::TypeScript) | Some(Language::JavaScript) => {
                    typescript::resolve_reference(table, &doc.file_path, &occ.symbol_fqn)
                }
                Some(Language::Go) => go::resolve_reference(table, &doc.file_path, &package_name, &occ.symbol_fqn),
                None => None,
            };
            let Some(target_fqn) = resolved else { continue };
            let Some(target_symbol) = table.get(&target_fqn) else { continue };
            let Some(source_id) = nearest_enclosing_node_id(doc, occ) else { continue };

            let edge_id = content_id(&[EdgeKind::References.as_str(), &source_id, &target_symbol.fqn]);
            new_edges.push(
                Edge::new(edge_id, EdgeKind::References, source_id, target_symbol.fqn.clone())
                    .with_span(occ.span)
                    .with_attr("resolved_file", serde_json::json!(target_symbol.definition_file)),
            );
        }
        doc.edges.extend(new_edges);
        doc.canonicalize();
    }
}

fn nearest_enclosing_node_id<'a>(doc: &'a IRDocument, occ: &Occurrence) -> Option<String> {
    doc.nodes
        .iter()
        .filter(|n| n.span.contains(&occ.span))
        .min_by_key(|n| n.span.line_count())
        .map(|n| n.id.clone())
}

impl IRDocument {
    fn language_hint(&self) -> Option<Language> {
        self.nodes.first().map(|n| n.language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, NodeKind, OccurrenceRole};
    use crate::span::Span;

    fn module_with_function(file: &str, fqn_prefix: &str, func_name: &str) -> IRDocument {
        let mut doc = IRDocument::empty("repo", "snap1", file);
        let module_span = Span::new(1, 0, 100, 0);
        doc.nodes.push(Node::new(
            format!("{file}:mod"),
            NodeKind::Module,
            fqn_prefix.to_string(),
            fqn_prefix.to_string(),
            file.to_string(),
            module_span,
            Language::Python,
        ));
        let func_fqn = format!("{fqn_prefix}.{func_name}");
        doc.nodes.push(Node::new(
            format!("{file}:{func_name}"),
            NodeKind::Function,
            func_fqn.clone(),
            func_name.to_string(),
            file.to_string(),
            Span::new(2, 0, 5, 0),
            Language::Python,
        ));
        doc.occurrences.push(Occurrence::new(func_fqn, file.to_string(), Span::new(2, 0, 5, 0), OccurrenceRole::Definition));
        doc
    }

    #[test]
    fn cross_file_call_resolves_to_definition() {
        let callee = module_with_function("lib.py", "lib", "helper");
        let mut caller = IRDocument::empty("repo", "snap1", "main.py");
        caller.nodes.push(Node::new(
            "main.py:mod".to_string(),
            NodeKind::Module,
            "main".to_string(),
            "main".to_string(),
            "main.py".to_string(),
            Span::new(1, 0, 20, 0),
            Language::Python,
        ));
        caller.occurrences.push(Occurrence::new("helper", "main.py".to_string(), Span::new(3, 4, 3, 10), OccurrenceRole::Reference));

        let mut docs = vec![callee, caller];
        let table = build_symbol_table(&mut docs);
        table.register_alias("main.py", "helper", "lib.helper");
        resolve_references(&mut docs, &table);

        let resolved_doc = docs.iter().find(|d| d.file_path == "main.py").unwrap();
        assert!(resolved_doc.edges.iter().any(|e| e.kind == EdgeKind::References && e.target_id == "lib.helper"));
    }
}
