//! Projects semantic-IR `Expression` nodes into the `Entity` view the
//! matcher operates on (§4.4 → §4.5 handoff). The semantic layer
//! annotates call/read expressions with `attrs` keys consumed here;
//! nodes missing an attr simply leave that `Entity` field `None`, which
//! only narrows which clauses can match rather than causing an error.

use crate::model::{Entity, EntityKind, Node, NodeKind};
use serde_json::Value;

fn attr_str(node: &Node, key: &str) -> Option<String> {
    node.attrs.get(key).and_then(Value::as_str).map(str::to_string)
}

fn attr_str_list(node: &Node, key: &str) -> Vec<String> {
    node.attrs
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

/// One `Entity` per `Expression` node that looks like a call, attribute
/// read, or assignment target — the three `EntityKind`s the matcher
/// reasons about. Nodes of other kinds produce no entity.
pub fn extract_entities(nodes: &[Node]) -> Vec<Entity> {
    nodes.iter().filter_map(entity_for_node).collect()
}

fn entity_for_node(node: &Node) -> Option<Entity> {
    if node.kind != NodeKind::Expression {
        return None;
    }
    let kind = match attr_str(node, "expr_kind").as_deref() {
        Some("call") => EntityKind::Call,
        Some("read") => EntityKind::Read,
        Some("assign") => EntityKind::Assign,
        _ => return None,
    };

    let mut entity = Entity::new(node.id.clone(), kind);
    entity.base_type = attr_str(node, "base_type");
    entity.call_name = attr_str(node, "call_name");
    entity.read_name = attr_str(node, "read_name");
    entity.qualified_call = attr_str(node, "qualified_call");
    entity.args = attr_str_list(node, "args");
    entity.guards = attr_str_list(node, "guards");
    Some(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Language;
    use crate::span::Span;

    fn call_node(id: &str, base_type: &str, call_name: &str) -> Node {
        Node::new(id.into(), NodeKind::Expression, format!("a.{id}"), id.into(), "a.py".into(), Span::zero(), Language::Python)
            .with_attr("expr_kind", serde_json::json!("call"))
            .with_attr("base_type", serde_json::json!(base_type))
            .with_attr("call_name", serde_json::json!(call_name))
    }

    #[test]
    fn call_expression_becomes_call_entity() {
        let node = call_node("e1", "sqlite3.Cursor", "execute");
        let entities = extract_entities(std::slice::from_ref(&node));
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].kind, EntityKind::Call);
        assert_eq!(entities[0].call_name.as_deref(), Some("execute"));
    }

    #[test]
    fn non_expression_nodes_are_skipped() {
        let node = Node::new("n1".into(), NodeKind::Function, "a.f".into(), "f".into(), "a.py".into(), Span::zero(), Language::Python);
        assert!(extract_entities(std::slice::from_ref(&node)).is_empty());
    }

    #[test]
    fn expression_without_expr_kind_attr_is_skipped() {
        let node = Node::new("n1".into(), NodeKind::Expression, "a.x".into(), "x".into(), "a.py".into(), Span::zero(), Language::Python);
        assert!(extract_entities(std::slice::from_ref(&node)).is_empty());
    }
}
