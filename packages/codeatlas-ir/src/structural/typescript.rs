//! TypeScript/JavaScript structural generator (§4.2, §4.3 "TypeScript/
//! JavaScript: walk named/default/re-exports").
//!
//! Also emits `TemplateSlot`s for JSX interpolations that bypass React's
//! default escaping (`dangerouslySetInnerHTML`), the one raw-HTML sink this
//! grammar can see without a separate template parser.

use super::context::GeneratorContext;
use super::StructuralGenerator;
use crate::diagnostics::Diagnostic;
use crate::model::{ContextKind, EdgeKind, EscapeMode, IRDocument, Language, Node, NodeKind, TemplateSlot};
use crate::parser_registry::{ts_to_span, Cst};
use tree_sitter::Node as TsNode;

pub struct TypeScriptGenerator;

impl StructuralGenerator for TypeScriptGenerator {
    fn generate(&self, cst: &Cst, repo_id: &str, snapshot_id: &str, file_path: &str) -> IRDocument {
        let mut ctx = GeneratorContext::new(cst, repo_id, snapshot_id, file_path);
        if ctx.cst.is_partial {
            ctx.add_diagnostic(Diagnostic::parse_failure(
                file_path,
                format!("{} parse error node(s); partial IR emitted", ctx.cst.error_count),
            ));
        }

        let module_fqn = file_path.to_string();
        let module_span = ts_to_span(&cst.root());
        let module_id = ctx.node_id(NodeKind::Module, &module_fqn, module_span);
        ctx.add_node(Node::new(
            module_id.clone(),
            NodeKind::Module,
            module_fqn.clone(),
            module_fqn.clone(),
            file_path.to_string(),
            module_span,
            Language::TypeScript,
        ));

        ctx.within_scope(&module_id, &module_fqn, |ctx| {
            walk(ctx, cst.root());
        });

        ctx.finish()
    }
}

fn walk(ctx: &mut GeneratorContext, node: TsNode) {
    match node.kind() {
        "function_declaration" | "method_definition" | "function" => extract_function(ctx, node),
        "class_declaration" => extract_class(ctx, node),
        "import_statement" => extract_import(ctx, node),
        "export_statement" => extract_export(ctx, node),
        "jsx_attribute" => {
            extract_template_slot(ctx, node);
            walk_children(ctx, node);
        }
        "identifier" => {
            let name = ctx.cst.node_text(&node).to_string();
            ctx.record_reference(&name, ts_to_span(&node));
        }
        _ => walk_children(ctx, node),
    }
}

fn walk_children(ctx: &mut GeneratorContext, node: TsNode) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(ctx, child);
    }
}

fn extract_function(ctx: &mut GeneratorContext, node: TsNode) {
    let name = node
        .child_by_field_name("name")
        .map(|n| ctx.cst.node_text(&n).to_string())
        .unwrap_or_else(|| "<anonymous>".to_string());
    if name == "<anonymous>" {
        walk_children(ctx, node);
        return;
    }
    let span = ts_to_span(&node);
    let fqn = ctx.fqn(&name);
    let kind = if node.kind() == "method_definition" { NodeKind::Method } else { NodeKind::Function };
    let node_id = ctx.node_id(kind, &fqn, span);
    let is_async = ctx.cst.node_text(&node).trim_start().starts_with("async");

    let mut ir_node = Node::new(node_id.clone(), kind, fqn.clone(), name.clone(), ctx.file_path.clone(), span, Language::TypeScript);
    ir_node.attrs.insert("is_async".into(), serde_json::json!(is_async));
    if let Some(parent) = ctx.parent_id.clone() {
        ir_node = ir_node.with_parent(parent);
    }
    ctx.add_node(ir_node);
    ctx.emit_contains(&node_id);
    ctx.record_definition(&fqn, &node_id, span);

    ctx.within_scope(&node_id, &name, |ctx| {
        if let Some(body) = node.child_by_field_name("body") {
            walk_children(ctx, body);
        }
    });
}

fn extract_class(ctx: &mut GeneratorContext, node: TsNode) {
    let Some(name_node) = node.child_by_field_name("name") else {
        walk_children(ctx, node);
        return;
    };
    let name = ctx.cst.node_text(&name_node).to_string();
    let span = ts_to_span(&node);
    let fqn = ctx.fqn(&name);
    let node_id = ctx.node_id(NodeKind::Class, &fqn, span);

    let mut ir_node = Node::new(node_id.clone(), NodeKind::Class, fqn.clone(), name.clone(), ctx.file_path.clone(), span, Language::TypeScript);
    if let Some(parent) = ctx.parent_id.clone() {
        ir_node = ir_node.with_parent(parent);
    }
    ctx.add_node(ir_node);
    ctx.emit_contains(&node_id);
    ctx.record_definition(&fqn, &node_id, span);

    if let Some(heritage) = node.child_by_field_name("superclass") {
        let base_name = ctx.cst.node_text(&heritage).to_string();
        let edge_id = ctx.edge_id(EdgeKind::Inherits, &node_id, &base_name);
        ctx.add_edge(crate::model::Edge::new(edge_id, EdgeKind::Inherits, node_id.clone(), base_name.clone()));
        ctx.record_reference(&base_name, ts_to_span(&heritage));
    }

    ctx.within_scope(&node_id, &name, |ctx| {
        if let Some(body) = node.child_by_field_name("body") {
            walk_children(ctx, body);
        }
    });
}

fn extract_import(ctx: &mut GeneratorContext, node: TsNode) {
    let span = ts_to_span(&node);
    let source = node
        .child_by_field_name("source")
        .map(|n| ctx.cst.node_text(&n).trim_matches(['"', '\'']).to_string())
        .unwrap_or_default();
    let fqn = format!("import:{source}");
    let node_id = ctx.node_id(NodeKind::Import, &fqn, span);
    let mut ir_node = Node::new(node_id.clone(), NodeKind::Import, fqn, source.clone(), ctx.file_path.clone(), span, Language::TypeScript);
    ir_node.attrs.insert("source".into(), serde_json::json!(source));
    ir_node.attrs.insert("is_barrel".into(), serde_json::json!(source.ends_with("/index") || source == "."));
    ir_node.attrs.insert("bindings".into(), serde_json::json!(import_bindings(ctx, &node)));
    if let Some(parent) = ctx.parent_id.clone() {
        ir_node = ir_node.with_parent(parent);
    }
    ctx.add_node(ir_node);
    ctx.emit_contains(&node_id);
}

/// Local name each import clause binds, paired with the name to look up in
/// the source module once resolved (empty string for a namespace/default
/// import, which binds the whole module) (§4.3).
fn import_bindings(ctx: &GeneratorContext, node: &TsNode) -> Vec<(String, String)> {
    let mut bindings = Vec::new();
    let Some(clause) = node.child_by_field_name("import") else { return bindings };
    let mut stack = vec![clause];
    while let Some(n) = stack.pop() {
        match n.kind() {
            "identifier" => bindings.push((ctx.cst.node_text(&n).to_string(), "default".to_string())),
            "namespace_import" => {
                if let Some(name) = n.named_child(0) {
                    bindings.push((ctx.cst.node_text(&name).to_string(), String::new()));
                }
            }
            "named_imports" => {
                let mut cursor = n.walk();
                for spec in n.children(&mut cursor) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    let imported = spec.child_by_field_name("name").map(|n| ctx.cst.node_text(&n).to_string());
                    let alias = spec.child_by_field_name("alias").map(|n| ctx.cst.node_text(&n).to_string());
                    if let Some(imported) = imported {
                        bindings.push((alias.unwrap_or_else(|| imported.clone()), imported));
                    }
                }
            }
            _ => {
                let mut cursor = n.walk();
                for child in n.children(&mut cursor) {
                    stack.push(child);
                }
            }
        }
    }
    bindings
}

/// Re-exports (`export { x } from './y'`, `export * from './barrel'`) are
/// modeled as Import nodes tagged `is_reexport`, since the resolver needs
/// the same `source` field to walk barrel chains transitively (§4.3).
fn extract_export(ctx: &mut GeneratorContext, node: TsNode) {
    let span = ts_to_span(&node);
    if let Some(source) = node.child_by_field_name("source") {
        let module = ctx.cst.node_text(&source).trim_matches(['"', '\'']).to_string();
        let fqn = format!("reexport:{module}");
        let node_id = ctx.node_id(NodeKind::Import, &fqn, span);
        let mut ir_node = Node::new(node_id.clone(), NodeKind::Import, fqn, module.clone(), ctx.file_path.clone(), span, Language::TypeScript);
        ir_node.attrs.insert("source".into(), serde_json::json!(module));
        ir_node.attrs.insert("is_reexport".into(), serde_json::json!(true));
        ctx.add_node(ir_node);
        ctx.emit_contains(&node_id);
        return;
    }
    walk_children(ctx, node);
}

fn extract_template_slot(ctx: &mut GeneratorContext, node: TsNode) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let attr_name = ctx.cst.node_text(&name_node);
    let Some(value) = node.child_by_field_name("value") else { return };
    let expr_text = ctx.cst.node_text(&value).to_string();

    let (context_kind, escape_mode) = match attr_name {
        "dangerouslySetInnerHTML" => (ContextKind::RawHtml, EscapeMode::None),
        "href" | "src" | "action" | "srcdoc" | "formAction" => (ContextKind::UrlAttr, EscapeMode::Auto),
        name if name.starts_with("on") && name.len() > 2 => (ContextKind::EventHandler, EscapeMode::JsString),
        "style" => (ContextKind::Style, EscapeMode::Auto),
        _ => return,
    };

    let slot = TemplateSlot::new(expr_text, ctx.file_path.clone(), ts_to_span(&node), context_kind).with_escape_mode(escape_mode);
    ctx.add_template_slot(slot);
}
