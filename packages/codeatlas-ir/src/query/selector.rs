//! Node/edge selector DSL (§4.6): `Var`, `Func`, `Call`, `Block`, `Class`,
//! `Module`, `Source`, `Sink`, `Field`, `Any`, plus edge selectors
//! `DFG`/`CFG`/`CALL`/`ALL` with `.backward()`/`.depth(max, min)`.

use crate::model::EdgeKind as ModelEdgeKind;
use serde::{Deserialize, Serialize};
use std::ops::BitOr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeSelectorKind {
    Var,
    Func,
    Call,
    Block,
    Class,
    Module,
    Source,
    Sink,
    Field,
    Any,
}

/// A selector over IR nodes (and, for `Source`/`Sink`, over taint matches
/// keyed by node id). `name`/`category`/`pattern` are mutually exclusive
/// by selector kind; `None` means "match every node of this kind".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSelector {
    pub kind: NodeSelectorKind,
    pub name: Option<String>,
    pub pattern: Option<String>,
    pub category: Option<String>,
    pub field_obj: Option<String>,
    pub field_name: Option<String>,
}

impl NodeSelector {
    fn bare(kind: NodeSelectorKind) -> Self {
        Self { kind, name: None, pattern: None, category: None, field_obj: None, field_name: None }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::bare(NodeSelectorKind::Var) }
    }

    pub fn func(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::bare(NodeSelectorKind::Func) }
    }

    pub fn call(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::bare(NodeSelectorKind::Call) }
    }

    pub fn block() -> Self {
        Self::bare(NodeSelectorKind::Block)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::bare(NodeSelectorKind::Class) }
    }

    pub fn module(pattern: impl Into<String>) -> Self {
        Self { pattern: Some(pattern.into()), ..Self::bare(NodeSelectorKind::Module) }
    }

    pub fn source(category: impl Into<String>) -> Self {
        Self { category: Some(category.into()), ..Self::bare(NodeSelectorKind::Source) }
    }

    pub fn sink(category: impl Into<String>) -> Self {
        Self { category: Some(category.into()), ..Self::bare(NodeSelectorKind::Sink) }
    }

    pub fn field(obj: impl Into<String>, field: impl Into<String>) -> Self {
        Self { field_obj: Some(obj.into()), field_name: Some(field.into()), ..Self::bare(NodeSelectorKind::Field) }
    }

    pub fn any() -> Self {
        Self::bare(NodeSelectorKind::Any)
    }
}

/// Union of node selectors (`a | b | c`), matched as OR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSelectorUnion {
    pub selectors: Vec<NodeSelector>,
}

impl BitOr<NodeSelector> for NodeSelector {
    type Output = NodeSelectorUnion;

    fn bitor(self, rhs: NodeSelector) -> NodeSelectorUnion {
        NodeSelectorUnion { selectors: vec![self, rhs] }
    }
}

impl BitOr<NodeSelector> for NodeSelectorUnion {
    type Output = NodeSelectorUnion;

    fn bitor(mut self, rhs: NodeSelector) -> NodeSelectorUnion {
        self.selectors.push(rhs);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeSelectorKind {
    Dfg,
    Cfg,
    Call,
    All,
}

impl EdgeSelectorKind {
    /// The model edge kinds this selector admits.
    pub fn matches(&self, kind: ModelEdgeKind) -> bool {
        match self {
            EdgeSelectorKind::All => true,
            EdgeSelectorKind::Dfg => kind.is_data_flow(),
            EdgeSelectorKind::Cfg => kind.is_control_flow(),
            EdgeSelectorKind::Call => matches!(kind, ModelEdgeKind::Calls),
        }
    }
}

/// An edge selector with direction and hop-depth bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeSelector {
    pub kind: EdgeSelectorKind,
    pub backward: bool,
    pub min_depth: usize,
    pub max_depth: usize,
}

impl EdgeSelector {
    fn new(kind: EdgeSelectorKind) -> Self {
        Self { kind, backward: false, min_depth: 1, max_depth: 10 }
    }

    pub fn dfg() -> Self {
        Self::new(EdgeSelectorKind::Dfg)
    }

    pub fn cfg() -> Self {
        Self::new(EdgeSelectorKind::Cfg)
    }

    pub fn call() -> Self {
        Self::new(EdgeSelectorKind::Call)
    }

    pub fn all() -> Self {
        Self::new(EdgeSelectorKind::All)
    }

    pub fn backward(mut self) -> Self {
        self.backward = true;
        self
    }

    pub fn depth(mut self, max: usize, min: usize) -> Self {
        self.max_depth = max;
        self.min_depth = min;
        self
    }
}

impl Default for EdgeSelector {
    fn default() -> Self {
        Self::all()
    }
}
