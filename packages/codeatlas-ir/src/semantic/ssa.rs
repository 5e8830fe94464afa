//! Optional SSA/dominator analysis (§4.4), gated by the `ssa` Cargo
//! feature. Off by default: most TRCR/query-engine consumers only need the
//! CFG's block/edge structure, and dominator computation adds a pass over
//! every function body that the default profile skips.

use crate::model::{EdgeKind, IRDocument, NodeKind};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Walker};
use std::collections::HashMap;

/// Iterative dominator computation (Cooper/Harvey/Kennedy), which
/// converges faster in practice than Lengauer-Tarjan on the small,
/// mostly-acyclic CFGs emitted per function.
pub fn compute_dominators(graph: &DiGraph<String, ()>, entry: NodeIndex) -> HashMap<NodeIndex, NodeIndex> {
    let postorder: Vec<NodeIndex> = Dfs::new(graph, entry).iter(graph).collect();
    let mut rpo = postorder.clone();
    rpo.reverse();
    let index_of: HashMap<NodeIndex, usize> = rpo.iter().enumerate().map(|(i, n)| (*n, i)).collect();

    let mut idom: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    idom.insert(entry, entry);

    let mut changed = true;
    while changed {
        changed = false;
        for &node in rpo.iter().skip(1) {
            let preds: Vec<NodeIndex> = graph.neighbors_directed(node, petgraph::Direction::Incoming).filter(|p| idom.contains_key(p)).collect();
            let Some(&first) = preds.first() else { continue };
            let mut new_idom = first;
            for &pred in &preds[1..] {
                new_idom = intersect(&idom, &index_of, new_idom, pred);
            }
            if idom.get(&node) != Some(&new_idom) {
                idom.insert(node, new_idom);
                changed = true;
            }
        }
    }
    idom.remove(&entry);
    idom
}

fn intersect(idom: &HashMap<NodeIndex, NodeIndex>, index_of: &HashMap<NodeIndex, usize>, mut a: NodeIndex, mut b: NodeIndex) -> NodeIndex {
    while a != b {
        while index_of[&a] > index_of[&b] {
            a = idom[&a];
        }
        while index_of[&b] > index_of[&a] {
            b = idom[&b];
        }
    }
    a
}

/// A node dominates a variable definition's uses if it appears on every
/// path from entry to that use; phi-node placement (SSA's renaming step)
/// is left to a future pass — this module currently exposes only the
/// dominator tree the query engine's `.dominated_by()` predicate needs.
pub fn dominates(idom: &HashMap<NodeIndex, NodeIndex>, entry: NodeIndex, candidate: NodeIndex, node: NodeIndex) -> bool {
    let mut current = node;
    if current == candidate {
        return true;
    }
    while current != entry {
        current = match idom.get(&current) {
            Some(&p) => p,
            None => return false,
        };
        if current == candidate {
            return true;
        }
    }
    false
}

/// Runs dominator computation over every function's CFG blocks and
/// records each block's immediate dominator as an `idom` attr (the
/// dominating block's node ID), so `.dominated_by()`-style queries don't
/// need to rebuild the graph themselves. Functions whose CFG has no
/// `Entry` block (parse failures, stub bodies) are skipped.
pub fn annotate_dominators(doc: &mut IRDocument) {
    let block_ids: Vec<String> = doc
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Block)
        .filter_map(|n| n.parent_id.clone())
        .collect();
    let mut functions: Vec<String> = block_ids;
    functions.sort();
    functions.dedup();

    for function_id in functions {
        annotate_function_dominators(doc, &function_id);
    }
}

fn annotate_function_dominators(doc: &mut IRDocument, function_id: &str) {
    let block_node_ids: Vec<String> = doc
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Block && n.parent_id.as_deref() == Some(function_id))
        .map(|n| n.id.clone())
        .collect();
    if block_node_ids.is_empty() {
        return;
    }

    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut index_of_id: HashMap<String, NodeIndex> = HashMap::new();
    for id in &block_node_ids {
        index_of_id.insert(id.clone(), graph.add_node(id.clone()));
    }
    for edge in doc.edges.iter().filter(|e| e.kind == EdgeKind::Cfg) {
        if let (Some(&from), Some(&to)) = (index_of_id.get(&edge.source_id), index_of_id.get(&edge.target_id)) {
            graph.add_edge(from, to, ());
        }
    }

    let entry_node_id = doc.nodes.iter().find(|n| {
        block_node_ids.contains(&n.id) && n.attrs.get("block_kind").and_then(|v| v.as_str()) == Some("Entry")
    });
    let Some(entry_node_id) = entry_node_id.map(|n| n.id.clone()) else { return };
    let Some(&entry_index) = index_of_id.get(&entry_node_id) else { return };

    let idom = compute_dominators(&graph, entry_index);
    let index_to_id: HashMap<NodeIndex, &String> = index_of_id.iter().map(|(id, idx)| (*idx, id)).collect();

    for (node_index, dominator_index) in &idom {
        let Some(node_id) = index_to_id.get(node_index).copied().cloned() else { continue };
        let Some(dominator_id) = index_to_id.get(dominator_index).copied().cloned() else { continue };
        if let Some(node) = doc.nodes.iter_mut().find(|n| n.id == node_id) {
            node.attrs.insert("idom".into(), serde_json::json!(dominator_id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_chain_dominator_tree() {
        let mut g = DiGraph::new();
        let a = g.add_node("entry".into());
        let b = g.add_node("b".into());
        let c = g.add_node("exit".into());
        g.add_edge(a, b, ());
        g.add_edge(b, c, ());

        let idom = compute_dominators(&g, a);
        assert_eq!(idom[&b], a);
        assert_eq!(idom[&c], b);
        assert!(dominates(&idom, a, a, c));
        assert!(dominates(&idom, a, b, c));
    }

    #[test]
    fn diamond_join_dominated_by_entry_only() {
        let mut g = DiGraph::new();
        let entry = g.add_node("entry".into());
        let left = g.add_node("left".into());
        let right = g.add_node("right".into());
        let join = g.add_node("join".into());
        g.add_edge(entry, left, ());
        g.add_edge(entry, right, ());
        g.add_edge(left, join, ());
        g.add_edge(right, join, ());

        let idom = compute_dominators(&g, entry);
        assert_eq!(idom[&join], entry);
        assert!(!dominates(&idom, entry, left, join));
    }

    fn block(id: &str, kind: &str, parent: &str) -> crate::model::Node {
        let mut node = crate::model::Node::new(
            id.to_string(),
            NodeKind::Block,
            format!("f.{id}"),
            id.to_string(),
            "a.py".to_string(),
            crate::span::Span::new(1, 0, 1, 0),
            crate::model::Language::Python,
        )
        .with_parent(parent.to_string());
        node.attrs.insert("block_kind".into(), serde_json::json!(kind));
        node
    }

    #[test]
    fn annotate_dominators_marks_idom_on_document_blocks() {
        let mut doc = IRDocument::empty("repo", "snap1", "a.py");
        doc.nodes.push(block("entry", "Entry", "f1"));
        doc.nodes.push(block("mid", "Normal", "f1"));
        doc.nodes.push(block("exit", "Exit", "f1"));
        doc.edges.push(crate::model::Edge::new("e1".into(), EdgeKind::Cfg, "entry".to_string(), "mid".to_string()));
        doc.edges.push(crate::model::Edge::new("e2".into(), EdgeKind::Cfg, "mid".to_string(), "exit".to_string()));

        annotate_dominators(&mut doc);

        let mid = doc.nodes.iter().find(|n| n.id == "mid").unwrap();
        assert_eq!(mid.attrs.get("idom").and_then(|v| v.as_str()), Some("entry"));
        let exit = doc.nodes.iter().find(|n| n.id == "exit").unwrap();
        assert_eq!(exit.attrs.get("idom").and_then(|v| v.as_str()), Some("mid"));
    }
}
