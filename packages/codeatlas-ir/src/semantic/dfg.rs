//! Data-flow edges (§4.4): `Reads`/`Writes` from each function/method to
//! each module/local variable used in its body. Variable identity is
//! recovered by scope lookup; when the variable is not in scope, no edge
//! is emitted — we never guess at an FQN the resolver didn't produce.

use crate::model::id::content_id;
use crate::model::{Edge, EdgeKind, IRDocument, Node, NodeKind, OccurrenceRole};

/// Runs after structural generation (and ideally after cross-file
/// resolution, so module-level variables imported from elsewhere are also
/// in scope). Mutates `doc.edges` in place.
pub fn build_data_flow_edges(doc: &mut IRDocument) {
    let callables: Vec<&Node> = doc.nodes.iter().filter(|n| n.is_callable()).collect();
    let mut new_edges = Vec::new();

    for func in &callables {
        let in_scope_vars = variables_in_scope(doc, func);
        for occ in &doc.occurrences {
            if !func.span.contains(&occ.span) {
                continue;
            }
            let Some(var) = in_scope_vars.iter().find(|v| v.fqn == occ.symbol_fqn) else { continue };
            let kind = match occ.role {
                OccurrenceRole::Reference => EdgeKind::Reads,
                OccurrenceRole::Write => EdgeKind::Writes,
                OccurrenceRole::Definition if var.id != func.id => EdgeKind::Writes,
                _ => continue,
            };
            let id = content_id(&[kind.as_str(), &func.id, &var.id, &format!("{:?}", occ.span.sort_key())]);
            new_edges.push(Edge::new(id, kind, func.id.clone(), var.id.clone()).with_span(occ.span));
        }
    }

    doc.edges.extend(new_edges);
    dedup_edges(doc);
}

/// Variables/parameters/constants whose declaration lives within `func`'s
/// span (locals) or at module scope (globals visible to every function in
/// the file) — the two scopes `Reads`/`Writes` are allowed to cross.
fn variables_in_scope<'a>(doc: &'a IRDocument, func: &Node) -> Vec<&'a Node> {
    let module_id = doc.nodes.iter().find(|n| n.kind == NodeKind::Module).map(|n| n.id.clone());
    doc.nodes
        .iter()
        .filter(|n| matches!(n.kind, NodeKind::Variable | NodeKind::Parameter | NodeKind::Constant))
        .filter(|n| func.span.contains(&n.span) || (module_id.is_some() && n.parent_id == module_id))
        .collect()
}

fn dedup_edges(doc: &mut IRDocument) {
    let mut seen = std::collections::HashSet::new();
    doc.edges.retain(|e| seen.insert(e.id.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Language, Occurrence};
    use crate::span::Span;

    #[test]
    fn read_of_in_scope_parameter_emits_reads_edge() {
        let mut doc = IRDocument::empty("repo", "snap1", "a.py");
        let func_span = Span::new(1, 0, 10, 0);
        let func = Node::new("f1".into(), NodeKind::Function, "a.f".into(), "f".into(), "a.py".into(), func_span, Language::Python);
        let param_span = Span::new(1, 5, 1, 6);
        let param = Node::new("p1".into(), NodeKind::Parameter, "a.f.x".into(), "x".into(), "a.py".into(), param_span, Language::Python)
            .with_parent("f1");
        doc.nodes.push(func);
        doc.nodes.push(param);
        doc.occurrences.push(Occurrence::new("a.f.x", "a.py", Span::new(3, 4, 3, 5), OccurrenceRole::Reference));

        build_data_flow_edges(&mut doc);
        assert!(doc.edges.iter().any(|e| e.kind == EdgeKind::Reads && e.source_id == "f1" && e.target_id == "p1"));
    }

    #[test]
    fn reference_to_out_of_scope_name_emits_no_edge() {
        let mut doc = IRDocument::empty("repo", "snap1", "a.py");
        let func = Node::new("f1".into(), NodeKind::Function, "a.f".into(), "f".into(), "a.py".into(), Span::new(1, 0, 10, 0), Language::Python);
        doc.nodes.push(func);
        doc.occurrences.push(Occurrence::new("ghost", "a.py", Span::new(3, 4, 3, 5), OccurrenceRole::Reference));

        build_data_flow_edges(&mut doc);
        assert!(doc.edges.is_empty());
    }
}
