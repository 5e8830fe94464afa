//! `Edge` — a typed directed relation between two `Node`s (§3).

use crate::span::Span;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeKind {
    Contains,
    Calls,
    Imports,
    References,
    Reads,
    Writes,
    Inherits,
    Implements,
    Throws,
    Returns,
    Yields,
    Dfg,
    Cfg,
}

impl EdgeKind {
    pub fn is_data_flow(&self) -> bool {
        matches!(self, EdgeKind::Dfg | EdgeKind::Reads | EdgeKind::Writes)
    }

    pub fn is_control_flow(&self) -> bool {
        matches!(self, EdgeKind::Cfg)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Contains => "Contains",
            EdgeKind::Calls => "Calls",
            EdgeKind::Imports => "Imports",
            EdgeKind::References => "References",
            EdgeKind::Reads => "Reads",
            EdgeKind::Writes => "Writes",
            EdgeKind::Inherits => "Inherits",
            EdgeKind::Implements => "Implements",
            EdgeKind::Throws => "Throws",
            EdgeKind::Returns => "Returns",
            EdgeKind::Yields => "Yields",
            EdgeKind::Dfg => "DFG",
            EdgeKind::Cfg => "CFG",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub kind: EdgeKind,
    pub source_id: String,
    pub target_id: String,
    pub span: Option<Span>,
    pub attrs: BTreeMap<String, Value>,
}

impl Edge {
    pub fn new(id: String, kind: EdgeKind, source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            source_id: source_id.into(),
            target_id: target_id.into(),
            span: None,
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }
}
