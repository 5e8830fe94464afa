//! `Symbol` — the cross-file resolver's view of a definition, and
//! `SymbolHash` — the incremental pipeline's per-symbol change fingerprint
//! (§3, §4.3, §4.7).

use crate::model::id::content_id;
use crate::model::node::Node;
use crate::span::Span;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Module,
    Class,
    Function,
    Method,
    Variable,
    Constant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub fqn: String,
    pub definition_file: String,
    pub definition_span: Span,
    pub kind: SymbolKind,
    /// Names this symbol re-exports (barrel files, `__init__.py` re-exports,
    /// Go dot-imports of a package's exported identifiers).
    pub exports: Vec<String>,
}

impl Symbol {
    pub fn new(fqn: impl Into<String>, definition_file: impl Into<String>, definition_span: Span, kind: SymbolKind) -> Self {
        Self {
            fqn: fqn.into(),
            definition_file: definition_file.into(),
            definition_span,
            kind,
            exports: Vec::new(),
        }
    }
}

/// Increasing order of invalidation breadth: a `SignatureChange` forces
/// re-resolution of every caller; a `StructuralChange` forces a full
/// re-walk of the containing file's structural IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ImpactClass {
    NoImpact,
    LocalIR,
    SignatureChange,
    StructuralChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolHash {
    pub symbol_id: String,
    /// Hash of the symbol's externally-visible signature (name, parameter
    /// types, return type, decorators that affect call sites).
    pub signature_hash: String,
    /// Hash of the symbol's full body content.
    pub body_hash: String,
    /// Hash of the symbol's structural shape only: signature plus the
    /// identity (kind + name) of its direct structural children, never body
    /// content. A body-only edit must leave this unchanged — otherwise
    /// every edit would classify as `StructuralChange` and `LocalIR` could
    /// never be reached (§4.7 step 1).
    pub impact_hash: String,
}

impl SymbolHash {
    /// Builds a symbol's fingerprint from its definition node, the file's
    /// full source text, and its direct structural children (the nodes one
    /// `Contains` hop away from `node`). `source` is sliced by `node.span`'s
    /// line range to get the body text; columns aren't tracked here, a
    /// file's own line boundaries are precise enough for change detection.
    pub fn compute(node: &Node, source: &str, children: &[&Node]) -> SymbolHash {
        let signature = signature_shape(node);
        let body = body_text(node, source);
        let children_shape: Vec<String> = children
            .iter()
            .map(|child| format!("{:?}:{}", child.kind, child.name))
            .collect();

        SymbolHash {
            symbol_id: node.id.clone(),
            signature_hash: content_id(&["signature", &signature]),
            body_hash: content_id(&["body", &body]),
            impact_hash: content_id(&["impact", &signature, &children_shape.join(",")]),
        }
    }

    pub fn classify_change(old: &SymbolHash, new: &SymbolHash) -> ImpactClass {
        if old.impact_hash != new.impact_hash {
            ImpactClass::StructuralChange
        } else if old.signature_hash != new.signature_hash {
            ImpactClass::SignatureChange
        } else if old.body_hash != new.body_hash {
            ImpactClass::LocalIR
        } else {
            ImpactClass::NoImpact
        }
    }
}

/// The externally-visible shape of a definition: kind, fqn, async-ness, and
/// (when the structural layer recorded one) its parameter/return signature
/// text — never its body.
fn signature_shape(node: &Node) -> String {
    let signature_attr = node
        .attrs
        .get("signature")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    format!("{:?}:{}:async={}:{}", node.kind, node.fqn, node.is_async(), signature_attr)
}

fn body_text(node: &Node, source: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let start = node.span.start_line.saturating_sub(1) as usize;
    let end = (node.span.end_line as usize).min(lines.len());
    if start >= end {
        return String::new();
    }
    lines[start..end].join("\n")
}
