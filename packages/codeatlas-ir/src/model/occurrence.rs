//! `Occurrence` — every textual mention of a symbol, definition or
//! reference, with span and role. Backs go-to-definition and find-references
//! without a second parse pass (§3).

use crate::span::Span;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OccurrenceRole {
    Definition,
    Reference,
    Write,
    Import,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occurrence {
    pub symbol_fqn: String,
    pub node_id: Option<String>,
    pub file_path: String,
    pub span: Span,
    pub role: OccurrenceRole,
}

impl Occurrence {
    pub fn new(symbol_fqn: impl Into<String>, file_path: impl Into<String>, span: Span, role: OccurrenceRole) -> Self {
        Self {
            symbol_fqn: symbol_fqn.into(),
            node_id: None,
            file_path: file_path.into(),
            span,
            role,
        }
    }

    pub fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    pub fn is_definition(&self) -> bool {
        matches!(self.role, OccurrenceRole::Definition)
    }
}
