//! Graph index, node matching, and the `QueryEngine` facade (§4.6).
//! `GraphIndex` gives O(1) node/edge lookups over one or more
//! `IRDocument`s plus the `AtomMatch`es that back `Source`/`Sink`
//! selectors.

use super::budget::Budget;
use super::selector::{NodeSelector, NodeSelectorKind, NodeSelectorUnion};
use super::strategy::{DepthFirstStrategy, ExecutionStrategy};
use crate::model::{Edge, IRDocument, Node, NodeKind};
use crate::taint::{AtomKind, AtomMatch};
use std::collections::HashMap;

pub struct GraphIndex {
    nodes_by_id: HashMap<String, Node>,
    nodes_by_name: HashMap<String, Vec<String>>,
    edges_from: HashMap<String, Vec<Edge>>,
    edges_to: HashMap<String, Vec<Edge>>,
    matches_by_node: HashMap<String, Vec<AtomMatch>>,
}

impl GraphIndex {
    pub fn build(docs: &[IRDocument], matches: &[AtomMatch]) -> Self {
        let mut index = GraphIndex {
            nodes_by_id: HashMap::new(),
            nodes_by_name: HashMap::new(),
            edges_from: HashMap::new(),
            edges_to: HashMap::new(),
            matches_by_node: HashMap::new(),
        };
        for doc in docs {
            for node in &doc.nodes {
                index.nodes_by_name.entry(node.name.clone()).or_default().push(node.id.clone());
                index.nodes_by_id.insert(node.id.clone(), node.clone());
            }
            for edge in &doc.edges {
                index.edges_from.entry(edge.source_id.clone()).or_default().push(edge.clone());
                index.edges_to.entry(edge.target_id.clone()).or_default().push(edge.clone());
            }
        }
        for m in matches {
            index.matches_by_node.entry(m.entity_id.clone()).or_default().push(m.clone());
        }
        index
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes_by_id.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes_by_id.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges_from.values().map(|v| v.len()).sum()
    }

    pub fn edges_from(&self, id: &str) -> &[Edge] {
        self.edges_from.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn edges_to(&self, id: &str) -> &[Edge] {
        self.edges_to.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    fn nodes_by_name(&self, name: &str) -> Vec<&Node> {
        self.nodes_by_name.get(name).into_iter().flatten().filter_map(|id| self.nodes_by_id.get(id)).collect()
    }

    fn all_nodes(&self) -> Vec<&Node> {
        self.nodes_by_id.values().collect()
    }

    fn matches_for(&self, node_id: &str, kind: AtomKind, category: &str) -> bool {
        self.matches_by_node
            .get(node_id)
            .into_iter()
            .flatten()
            .any(|m| m.kind == kind && (category.is_empty() || m.atom_id.contains(category)))
    }
}

/// Resolves a `NodeSelector` to the concrete nodes it matches.
pub struct NodeMatcher<'a> {
    index: &'a GraphIndex,
}

impl<'a> NodeMatcher<'a> {
    pub fn new(index: &'a GraphIndex) -> Self {
        Self { index }
    }

    pub fn match_selector(&self, selector: &NodeSelector) -> Vec<&'a Node> {
        match selector.kind {
            NodeSelectorKind::Var => self.by_name_and_kind(selector, &[NodeKind::Variable, NodeKind::Parameter, NodeKind::Constant]),
            NodeSelectorKind::Func => self.by_name_and_kind(selector, &[NodeKind::Function, NodeKind::Method]),
            NodeSelectorKind::Call => self.by_name_and_kind(selector, &[NodeKind::Function, NodeKind::Method, NodeKind::Expression]),
            NodeSelectorKind::Block => self.index.all_nodes().into_iter().filter(|n| n.kind == NodeKind::Block).collect(),
            NodeSelectorKind::Class => self.by_name_and_kind(selector, &[NodeKind::Class]),
            NodeSelectorKind::Module => {
                let pattern = selector.pattern.as_deref().unwrap_or("*");
                self.index
                    .all_nodes()
                    .into_iter()
                    .filter(|n| n.kind == NodeKind::Module && glob_match(pattern, &n.fqn))
                    .collect()
            }
            NodeSelectorKind::Source => {
                let category = selector.category.as_deref().unwrap_or("");
                self.index.all_nodes().into_iter().filter(|n| self.index.matches_for(&n.id, AtomKind::Source, category)).collect()
            }
            NodeSelectorKind::Sink => {
                let category = selector.category.as_deref().unwrap_or("");
                self.index.all_nodes().into_iter().filter(|n| self.index.matches_for(&n.id, AtomKind::Sink, category)).collect()
            }
            NodeSelectorKind::Field => self.index.all_nodes().into_iter().filter(|n| n.kind == NodeKind::Field).collect(),
            NodeSelectorKind::Any => self.index.all_nodes(),
        }
    }

    pub fn match_union(&self, union: &NodeSelectorUnion) -> Vec<&'a Node> {
        let mut seen = std::collections::HashSet::new();
        union
            .selectors
            .iter()
            .flat_map(|s| self.match_selector(s))
            .filter(|n| seen.insert(n.id.clone()))
            .collect()
    }

    fn by_name_and_kind(&self, selector: &NodeSelector, kinds: &[NodeKind]) -> Vec<&'a Node> {
        match &selector.name {
            Some(name) => self.index.nodes_by_name(name).into_iter().filter(|n| kinds.contains(&n.kind)).collect(),
            None => self.index.all_nodes().into_iter().filter(|n| kinds.contains(&n.kind)).collect(),
        }
    }
}

fn glob_match(pattern: &str, value: &str) -> bool {
    globset::Glob::new(pattern).map(|g| g.compile_matcher().is_match(value)).unwrap_or(false)
}

#[derive(Debug, Clone, Default)]
pub struct PathResult {
    pub node_ids: Vec<String>,
    pub edge_ids: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PathSet {
    pub paths: Vec<PathResult>,
    pub budget_exhausted: bool,
    /// How many nodes matched the query's source selector, and how many
    /// of those had at least one discovered path to a target — the
    /// basis for `forall_paths` ("does every matched source reach a
    /// target?").
    pub sources_total: usize,
    pub sources_reached: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct VerificationResult {
    pub holds: bool,
    pub budget_exhausted: bool,
}

/// Main entry point: builds an index once, then executes flow queries
/// against it through a pluggable `ExecutionStrategy` (§4.6 "A pluggable
/// strategy chooses ordering and indexes").
pub struct QueryEngine {
    index: GraphIndex,
    strategy: Box<dyn ExecutionStrategy>,
}

impl QueryEngine {
    pub fn new(docs: &[IRDocument], matches: &[AtomMatch]) -> Self {
        Self { index: GraphIndex::build(docs, matches), strategy: Box::new(DepthFirstStrategy) }
    }

    pub fn with_strategy(docs: &[IRDocument], matches: &[AtomMatch], strategy: Box<dyn ExecutionStrategy>) -> Self {
        Self { index: GraphIndex::build(docs, matches), strategy }
    }

    pub fn existential(&self, query: &super::algebra::PathQuery, budget: Budget) -> PathSet {
        self.strategy.find_paths(&self.index, query, budget)
    }

    pub fn universal(&self, query: &super::algebra::PathQuery, budget: Budget) -> VerificationResult {
        let path_set = self.strategy.find_paths(&self.index, query, budget);
        let holds = path_set.sources_total > 0 && path_set.sources_reached == path_set.sources_total && !path_set.budget_exhausted;
        VerificationResult { holds, budget_exhausted: path_set.budget_exhausted }
    }

    pub fn stats(&self) -> (usize, usize) {
        (self.index.node_count(), self.index.edge_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeKind, Language, Span};
    use crate::query::algebra::{FlowExpr, TraversalDirection};
    use crate::query::selector::EdgeSelector;

    fn chain_doc() -> IRDocument {
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
    fn engine_reports_node_and_edge_counts() {
        let doc = chain_doc();
        let engine = QueryEngine::new(std::slice::from_ref(&doc), &[]);
        assert_eq!(engine.stats(), (3, 2));
    }

    #[test]
    fn existential_query_finds_chain_path() {
        let doc = chain_doc();
        let engine = QueryEngine::new(std::slice::from_ref(&doc), &[]);
        let flow = FlowExpr::new(NodeSelector::var("user"), NodeSelector::func("execute"), TraversalDirection::Forward).via(EdgeSelector::dfg());
        let query = flow.existential_path();
        let result = engine.existential(&query, Budget::default_preset());
        assert_eq!(result.paths.len(), 1);
        assert_eq!(result.paths[0].node_ids, vec!["n1", "n2", "n3"]);
    }
}
