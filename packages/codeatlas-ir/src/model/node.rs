//! `Node` — an atom of code structure (§3).

use crate::span::Span;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Module,
    Class,
    Function,
    Method,
    Variable,
    Parameter,
    Field,
    Constant,
    Import,
    Block,
    Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    Python,
    TypeScript,
    JavaScript,
    Go,
}

/// Open attribute map (modifiers, signature, generics, docstring, decorators,
/// is_async, visibility, ...). `BTreeMap` so serialized IRDocuments are
/// byte-stable regardless of insertion order (§5 determinism invariant).
pub type Attrs = BTreeMap<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub fqn: String,
    pub name: String,
    pub file_path: String,
    pub span: Span,
    pub language: Language,
    pub attrs: Attrs,
    pub parent_id: Option<String>,
}

impl Node {
    /// `id` is derived by the caller via `model::id::content_id` from
    /// `(kind, fqn, span, file_path)` — never from `attrs`, so that renaming
    /// a docstring or decorator doesn't change a node's identity wholesale;
    /// see `SymbolHash` for the finer-grained body/signature split.
    pub fn new(
        id: String,
        kind: NodeKind,
        fqn: impl Into<String>,
        name: impl Into<String>,
        file_path: impl Into<String>,
        span: Span,
        language: Language,
    ) -> Self {
        Self {
            id,
            kind,
            fqn: fqn.into(),
            name: name.into(),
            file_path: file_path.into(),
            span,
            language,
            attrs: Attrs::new(),
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.kind, NodeKind::Function | NodeKind::Method)
    }

    pub fn is_async(&self) -> bool {
        self.attrs
            .get("is_async")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}
