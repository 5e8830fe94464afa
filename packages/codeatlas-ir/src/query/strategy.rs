//! Execution strategies (§4.6: "A pluggable strategy chooses ordering and
//! indexes. The default is depth-first with eager evaluation. A
//! cost-based strategy uses graph statistics to reorder steps. All
//! strategies produce identical result sets for terminating queries.").

use super::algebra::{PathQuery, TraversalDirection};
use super::budget::{Budget, BudgetTracker};
use super::engine::{GraphIndex, NodeMatcher, PathResult, PathSet};
use std::collections::HashSet;

/// A pluggable search over a `GraphIndex`. Implementations must agree on
/// result sets for queries that terminate within budget; they may differ
/// only in the order candidates are explored and in which partial
/// results survive when the budget is exhausted first.
pub trait ExecutionStrategy: Send + Sync {
    fn find_paths(&self, index: &GraphIndex, query: &PathQuery, budget: Budget) -> PathSet;
}

/// Depth-first, eager evaluation: explores each source's neighborhood to
/// exhaustion (bounded by depth/node/edge budgets) before moving to the
/// next source. This is the default strategy; a cost-based strategy can
/// reorder which sources/edges are tried first without changing which
/// paths are found for a query that terminates within budget.
pub struct DepthFirstStrategy;

impl ExecutionStrategy for DepthFirstStrategy {
    fn find_paths(&self, index: &GraphIndex, query: &PathQuery, budget: Budget) -> PathSet {
        let matcher = NodeMatcher::new(index);
        let sources = matcher.match_selector(&query.flow.source);
        let targets: HashSet<String> = matcher.match_selector(&query.flow.target).into_iter().map(|n| n.id.clone()).collect();

        let mut tracker = BudgetTracker::new(budget);
        let mut paths = Vec::new();
        let mut sources_reached = 0usize;
        let sources_total = sources.len();

        'sources: for source in &sources {
            if tracker.exhausted() {
                break;
            }
            let mut visited = HashSet::new();
            let mut stack = vec![(source.id.clone(), vec![source.id.clone()], Vec::<String>::new(), 0usize)];
            while let Some((current, node_path, edge_path, depth)) = stack.pop() {
                if tracker.exhausted() {
                    break 'sources;
                }
                if targets.contains(&current) && depth > 0 {
                    paths.push(PathResult { node_ids: node_path.clone(), edge_ids: edge_path.clone() });
                    sources_reached += 1;
                    if !tracker.try_record_path() {
                        break 'sources;
                    }
                    if query.quantifier == super::algebra::QuantifierKind::Existential {
                        continue 'sources;
                    }
                }
                if tracker.depth_exceeded(depth + 1) {
                    continue;
                }
                if !visited.insert(current.clone()) {
                    continue;
                }
                if !tracker.try_visit_node() {
                    break 'sources;
                }
                // The selector's own `.backward()` flips the edge walk
                // independently of the flow's `>>`/`<<` direction, so a
                // forward flow can still walk an edge kind "upstream"
                // (e.g. following CFG predecessors while reasoning about
                // forward dataflow).
                let walk_forward = match query.flow.direction {
                    TraversalDirection::Forward => !query.flow.edge.backward,
                    TraversalDirection::Backward => query.flow.edge.backward,
                };
                let neighbors = if walk_forward { index.edges_from(&current) } else { index.edges_to(&current) };
                for edge in neighbors {
                    if !query.flow.edge.kind.matches(edge.kind) {
                        continue;
                    }
                    if !tracker.try_traverse_edge() {
                        break 'sources;
                    }
                    let next = if walk_forward { edge.target_id.clone() } else { edge.source_id.clone() };
                    if visited.contains(&next) {
                        continue;
                    }
                    let mut next_nodes = node_path.clone();
                    next_nodes.push(next.clone());
                    let mut next_edges = edge_path.clone();
                    next_edges.push(edge.id.clone());
                    stack.push((next, next_nodes, next_edges, depth + 1));
                }
            }
        }

        PathSet { paths, budget_exhausted: tracker.exhausted(), sources_total, sources_reached }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, EdgeKind, IRDocument, Language, Node, NodeKind, Span};
    use crate::query::algebra::FlowExpr;
    use crate::query::selector::{EdgeSelector, NodeSelector};

    fn linear_doc() -> IRDocument {
        let mut doc = IRDocument::empty("repo", "snap", "a.py");
        let span = Span::new(1, 0, 1, 1);
        doc.nodes.push(Node::new("n1".into(), NodeKind::Variable, "a.user".into(), "user".into(), "a.py".into(), span, Language::Python));
        doc.nodes.push(Node::new("n2".into(), NodeKind::Variable, "a.temp".into(), "temp".into(), "a.py".into(), span, Language::Python));
        doc.nodes.push(Node::new("n3".into(), NodeKind::Function, "a.execute".into(), "execute".into(), "a.py".into(), span, Language::Python));
        doc.edges.push(Edge::new("e1".into(), EdgeKind::Dfg, "n1".into(), "n2".into()));
        doc.edges.push(Edge::new("e2".into(), EdgeKind::Dfg, "n2".into(), "n3".into()));
        doc
    }

    #[test]
    fn depth_first_finds_multi_hop_chain() {
        let doc = linear_doc();
        let index = GraphIndex::build(std::slice::from_ref(&doc), &[]);
        let flow = FlowExpr::new(NodeSelector::var("user"), NodeSelector::func("execute"), TraversalDirection::Forward).via(EdgeSelector::dfg());
        let query = flow.existential_path();
        let result = DepthFirstStrategy.find_paths(&index, &query, Budget::default_preset());
        assert_eq!(result.paths.len(), 1);
        assert_eq!(result.paths[0].edge_ids, vec!["e1", "e2"]);
    }

    #[test]
    fn tight_budget_marks_result_exhausted() {
        let doc = linear_doc();
        let index = GraphIndex::build(std::slice::from_ref(&doc), &[]);
        let flow = FlowExpr::new(NodeSelector::var("user"), NodeSelector::func("execute"), TraversalDirection::Forward).via(EdgeSelector::dfg());
        let query = flow.existential_path();
        let tiny = Budget { max_nodes: 1, ..Budget::light() };
        let result = DepthFirstStrategy.find_paths(&index, &query, tiny);
        assert!(result.budget_exhausted);
    }

    #[test]
    fn no_path_when_target_unreachable() {
        let doc = linear_doc();
        let index = GraphIndex::build(std::slice::from_ref(&doc), &[]);
        let flow = FlowExpr::new(NodeSelector::var("temp"), NodeSelector::var("user"), TraversalDirection::Forward).via(EdgeSelector::dfg());
        let query = flow.existential_path();
        let result = DepthFirstStrategy.find_paths(&index, &query, Budget::default_preset());
        assert!(result.paths.is_empty());
        assert!(!result.budget_exhausted);
    }
}
