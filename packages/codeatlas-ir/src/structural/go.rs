//! Go structural generator (§4.2, §4.3 "Go: package-level exported
//! identifiers... visible within the same module path").

use super::context::GeneratorContext;
use super::StructuralGenerator;
use crate::diagnostics::Diagnostic;
use crate::model::{IRDocument, Language, Node, NodeKind};
use crate::parser_registry::{ts_to_span, Cst};
use tree_sitter::Node as TsNode;

pub struct GoGenerator;

impl StructuralGenerator for GoGenerator {
    fn generate(&self, cst: &Cst, repo_id: &str, snapshot_id: &str, file_path: &str) -> IRDocument {
        let mut ctx = GeneratorContext::new(cst, repo_id, snapshot_id, file_path);
        if ctx.cst.is_partial {
            ctx.add_diagnostic(Diagnostic::parse_failure(
                file_path,
                format!("{} parse error node(s); partial IR emitted", ctx.cst.error_count),
            ));
        }

        let package_name = package_name(&ctx, cst.root());
        let module_span = ts_to_span(&cst.root());
        let module_id = ctx.node_id(NodeKind::Module, &package_name, module_span);
        let mut module_node = Node::new(
            module_id.clone(),
            NodeKind::Module,
            package_name.clone(),
            package_name.clone(),
            file_path.to_string(),
            module_span,
            Language::Go,
        );
        module_node.attrs.insert("package".into(), serde_json::json!(package_name));
        ctx.add_node(module_node);

        ctx.within_scope(&module_id, &package_name, |ctx| {
            walk_children(ctx, cst.root());
        });

        ctx.finish()
    }
}

fn package_name(ctx: &GeneratorContext, root: TsNode) -> String {
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() == "package_clause" {
            if let Some(name) = child.named_child(0) {
                return ctx.cst.node_text(&name).to_string();
            }
        }
    }
    "main".to_string()
}

fn walk_children(ctx: &mut GeneratorContext, node: TsNode) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "function_declaration" => extract_function(ctx, child, None),
            "method_declaration" => {
                let receiver_type = child
                    .child_by_field_name("receiver")
                    .and_then(|r| r.named_child(0))
                    .map(|p| ctx.cst.node_text(&p).to_string());
                extract_function(ctx, child, receiver_type);
            }
            "type_declaration" => extract_type(ctx, child),
            "import_declaration" => extract_import(ctx, child),
            "var_declaration" | "const_declaration" => extract_var(ctx, child),
            "identifier" => {
                let name = ctx.cst.node_text(&child).to_string();
                ctx.record_reference(&name, ts_to_span(&child));
            }
            _ => walk_children(ctx, child),
        }
    }
}

fn is_exported(name: &str) -> bool {
    name.chars().next().map(char::is_uppercase).unwrap_or(false)
}

fn extract_function(ctx: &mut GeneratorContext, node: TsNode, receiver_type: Option<String>) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = ctx.cst.node_text(&name_node).to_string();
    let span = ts_to_span(&node);
    let fqn = match &receiver_type {
        Some(recv) => format!("{}.{}.{}", ctx.fqn_prefix(), recv, name),
        None => ctx.fqn(&name),
    };
    let kind = if receiver_type.is_some() { NodeKind::Method } else { NodeKind::Function };
    let node_id = ctx.node_id(kind, &fqn, span);

    let mut ir_node = Node::new(node_id.clone(), kind, fqn.clone(), name.clone(), ctx.file_path.clone(), span, Language::Go);
    ir_node.attrs.insert("exported".into(), serde_json::json!(is_exported(&name)));
    if let Some(recv) = &receiver_type {
        ir_node.attrs.insert("receiver_type".into(), serde_json::json!(recv));
    }
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

fn extract_type(ctx: &mut GeneratorContext, node: TsNode) {
    let mut cursor = node.walk();
    for spec in node.children(&mut cursor) {
        if spec.kind() != "type_spec" {
            continue;
        }
        let Some(name_node) = spec.child_by_field_name("name") else { continue };
        let name = ctx.cst.node_text(&name_node).to_string();
        let span = ts_to_span(&spec);
        let fqn = ctx.fqn(&name);
        let node_id = ctx.node_id(NodeKind::Class, &fqn, span);
        let mut ir_node = Node::new(node_id.clone(), NodeKind::Class, fqn.clone(), name.clone(), ctx.file_path.clone(), span, Language::Go);
        ir_node.attrs.insert("exported".into(), serde_json::json!(is_exported(&name)));
        if let Some(parent) = ctx.parent_id.clone() {
            ir_node = ir_node.with_parent(parent);
        }
        ctx.add_node(ir_node);
        ctx.emit_contains(&node_id);
        ctx.record_definition(&fqn, &node_id, span);
    }
}

fn extract_import(ctx: &mut GeneratorContext, node: TsNode) {
    let mut cursor = node.walk();
    for spec in node.children(&mut cursor) {
        if spec.kind() != "import_spec" {
            continue;
        }
        let path_node = spec.child_by_field_name("path").unwrap_or(spec);
        let path = ctx.cst.node_text(&path_node).trim_matches('"').to_string();
        let span = ts_to_span(&spec);
        let fqn = format!("import:{path}");
        let node_id = ctx.node_id(NodeKind::Import, &fqn, span);
        let mut ir_node = Node::new(node_id.clone(), NodeKind::Import, fqn, path.clone(), ctx.file_path.clone(), span, Language::Go);
        ir_node.attrs.insert("path".into(), serde_json::json!(path));
        let default_alias = path.rsplit('/').next().unwrap_or(&path).to_string();
        let alias = spec
            .child_by_field_name("name")
            .map(|n| ctx.cst.node_text(&n).to_string())
            .unwrap_or(default_alias);
        ir_node.attrs.insert("alias".into(), serde_json::json!(alias));
        ctx.add_node(ir_node);
        ctx.emit_contains(&node_id);
    }
}

fn extract_var(ctx: &mut GeneratorContext, node: TsNode) {
    let kind_for_decl = if node.kind() == "const_declaration" { NodeKind::Constant } else { NodeKind::Variable };
    let mut cursor = node.walk();
    for spec in node.children(&mut cursor) {
        if !matches!(spec.kind(), "var_spec" | "const_spec") {
            continue;
        }
        let mut inner = spec.walk();
        for name_node in spec.children(&mut inner) {
            if name_node.kind() != "identifier" {
                continue;
            }
            let name = ctx.cst.node_text(&name_node).to_string();
            let span = ts_to_span(&name_node);
            let fqn = ctx.fqn(&name);
            let node_id = ctx.node_id(kind_for_decl, &fqn, span);
            let mut ir_node = Node::new(node_id.clone(), kind_for_decl, fqn.clone(), name.clone(), ctx.file_path.clone(), span, Language::Go);
            ir_node.attrs.insert("exported".into(), serde_json::json!(is_exported(&name)));
            if let Some(parent) = ctx.parent_id.clone() {
                ir_node = ir_node.with_parent(parent);
            }
            ctx.add_node(ir_node);
            ctx.emit_contains(&node_id);
            ctx.record_definition(&fqn, &node_id, span);
        }
    }
}
