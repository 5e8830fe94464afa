//! Query Engine (§4.6): a flow-query algebra (`a >> b`, `a > b`, `a << b`,
//! `.via()`) over node/edge selectors, executed by a pluggable,
//! budget-bounded strategy against an indexed `IRDocument` set.

pub mod algebra;
pub mod budget;
pub mod engine;
pub mod selector;
pub mod strategy;

pub use algebra::{FlowExpr, PathQuery, QuantifierKind, TraversalDirection};
pub use budget::{Budget, BudgetTracker};
pub use engine::{GraphIndex, NodeMatcher, PathResult, PathSet, QueryEngine, VerificationResult};
pub use selector::{EdgeSelector, EdgeSelectorKind, NodeSelector, NodeSelectorKind, NodeSelectorUnion};
pub use strategy::{DepthFirstStrategy, ExecutionStrategy};

/// Selector factory, mirroring the fluent `Q::var(...)` style used
/// elsewhere in this codebase for fixed-vocabulary constructors.
pub struct Q;

impl Q {
    pub fn var(name: impl Into<String>) -> NodeSelector {
        NodeSelector::var(name)
    }
    pub fn func(name: impl Into<String>) -> NodeSelector {
        NodeSelector::func(name)
    }
    pub fn call(name: impl Into<String>) -> NodeSelector {
        NodeSelector::call(name)
    }
    pub fn block() -> NodeSelector {
        NodeSelector::block()
    }
    pub fn class(name: impl Into<String>) -> NodeSelector {
        NodeSelector::class(name)
    }
    pub fn module(pattern: impl Into<String>) -> NodeSelector {
        NodeSelector::module(pattern)
    }
    pub fn source(category: impl Into<String>) -> NodeSelector {
        NodeSelector::source(category)
    }
    pub fn sink(category: impl Into<String>) -> NodeSelector {
        NodeSelector::sink(category)
    }
    pub fn field(obj: impl Into<String>, field: impl Into<String>) -> NodeSelector {
        NodeSelector::field(obj, field)
    }
    pub fn any() -> NodeSelector {
        NodeSelector::any()
    }
}

/// Edge selector factory, paired with `Q`.
pub struct E;

impl E {
    pub fn dfg() -> EdgeSelector {
        EdgeSelector::dfg()
    }
    pub fn cfg() -> EdgeSelector {
        EdgeSelector::cfg()
    }
    pub fn call() -> EdgeSelector {
        EdgeSelector::call()
    }
    pub fn all() -> EdgeSelector {
        EdgeSelector::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, EdgeKind, IRDocument, Language, Node, NodeKind, Span};

    #[test]
    fn q_and_e_factories_compose_an_executable_query() {
        let mut doc = IRDocument::empty("repo", "snap", "a.py");
        let span = Span::new(1, 0, 1, 1);
        doc.nodes.push(Node::new("n1".into(), NodeKind::Variable, "a.user".into(), "user".into(), "a.py".into(), span, Language::Python));
        doc.nodes.push(Node::new("n2".into(), NodeKind::Function, "a.execute".into(), "execute".into(), "a.py".into(), span, Language::Python));
        doc.edges.push(Edge::new("e1".into(), EdgeKind::Dfg, "n1".into(), "n2".into()));

        let engine = QueryEngine::new(std::slice::from_ref(&doc), &[]);
        let query = (Q::var("user") >> Q::func("execute")).via(E::dfg()).existential_path();
        let result = engine.existential(&query, Budget::light());
        assert_eq!(result.paths.len(), 1);
    }
}
