//! Flow operators (§4.6): `a >> b` (reachable via edges), `a > b` (direct
//! edge), `a << b` (backward), `.via(edge_selector)`. `a >> b` is an
//! existential `PathSet` query; `.forall_paths()` promotes it to a
//! universal `VerificationResult` query.

use super::selector::{EdgeSelector, NodeSelector};
use std::ops::{Shl, Shr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantifierKind {
    /// `a >> b`: does at least one path exist?
    Existential,
    /// `forall_paths`: does every path satisfy the constraints?
    Universal,
}

#[derive(Debug, Clone)]
pub struct FlowExpr {
    pub source: NodeSelector,
    pub target: NodeSelector,
    pub direction: TraversalDirection,
    pub edge: EdgeSelector,
}

impl FlowExpr {
    pub fn new(source: NodeSelector, target: NodeSelector, direction: TraversalDirection) -> Self {
        Self { source, target, direction, edge: EdgeSelector::all() }
    }

    pub fn via(mut self, edge: EdgeSelector) -> Self {
        self.edge = edge;
        self
    }

    pub fn existential_path(self) -> PathQuery {
        PathQuery::new(self, QuantifierKind::Existential)
    }

    pub fn forall_paths(self) -> PathQuery {
        PathQuery::new(self, QuantifierKind::Universal)
    }
}

/// `a >> b`: forward reachability, one or more hops.
impl Shr<NodeSelector> for NodeSelector {
    type Output = FlowExpr;

    fn shr(self, rhs: NodeSelector) -> FlowExpr {
        FlowExpr::new(self, rhs, TraversalDirection::Forward)
    }
}

/// `a << b`: `a` is reached by walking backward from `b`.
impl Shl<NodeSelector> for NodeSelector {
    type Output = FlowExpr;

    fn shl(self, rhs: NodeSelector) -> FlowExpr {
        FlowExpr::new(self, rhs, TraversalDirection::Backward)
    }
}

/// An executable flow query: a `FlowExpr` plus the budget and quantifier
/// that govern how it's run. `a > b` (the "direct edge" operator of
/// §4.6) is just `a >> b` with depth bounded to exactly one hop, applied
/// via `.direct()`.
#[derive(Debug, Clone)]
pub struct PathQuery {
    pub flow: FlowExpr,
    pub quantifier: QuantifierKind,
}

impl PathQuery {
    fn new(flow: FlowExpr, quantifier: QuantifierKind) -> Self {
        Self { flow, quantifier }
    }

    /// Restricts the query to a direct (one-hop) edge, matching the
    /// algebra's `a > b` shorthand.
    pub fn direct(mut self) -> Self {
        self.flow.edge = self.flow.edge.depth(1, 1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_operator_builds_forward_flow_expr() {
        let expr = NodeSelector::source("request") >> NodeSelector::sink("execute");
        assert_eq!(expr.direction, TraversalDirection::Forward);
    }

    #[test]
    fn backward_operator_builds_backward_flow_expr() {
        let expr = NodeSelector::call("execute") << NodeSelector::var("user");
        assert_eq!(expr.direction, TraversalDirection::Backward);
    }

    #[test]
    fn direct_restricts_depth_to_one_hop() {
        let query = (NodeSelector::var("a") >> NodeSelector::var("b")).existential_path().direct();
        assert_eq!((query.flow.edge.min_depth, query.flow.edge.max_depth), (1, 1));
    }
}
