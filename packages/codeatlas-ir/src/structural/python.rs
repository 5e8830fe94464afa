//! Python structural generator (§4.2, §4.3 "Python: walk import, from …
//! import, import … as").

use super::context::GeneratorContext;
use super::StructuralGenerator;
use crate::diagnostics::Diagnostic;
use crate::model::{EdgeKind, IRDocument, Language, Node, NodeKind};
use crate::parser_registry::{ts_to_span, Cst};
use crate::semantic::cfg::{BlockKind, CfgBuilder, CfgEdgeKind};
use crate::span::Span;
use tree_sitter::Node as TsNode;

pub struct PythonGenerator;

/// What a just-extracted call expression tells its caller: its own node ID
/// plus enough of its callee shape for an enclosing assignment to guess the
/// assigned name's type.
struct CallInfo {
    node_id: String,
    base_type: Option<String>,
    qualified_call: String,
}

impl StructuralGenerator for PythonGenerator {
    fn generate(&self, cst: &Cst, repo_id: &str, snapshot_id: &str, file_path: &str) -> IRDocument {
        let mut ctx = GeneratorContext::new(cst, repo_id, snapshot_id, file_path);
        if ctx.cst.is_partial {
            ctx.add_diagnostic(Diagnostic::parse_failure(
                file_path,
                format!("{} parse error node(s); partial IR emitted", ctx.cst.error_count),
            ));
        }

        let module_fqn = module_fqn_from_path(file_path);
        let module_span = ts_to_span(&cst.root());
        let module_id = ctx.node_id(NodeKind::Module, &module_fqn, module_span);
        ctx.add_node(Node::new(
            module_id.clone(),
            NodeKind::Module,
            module_fqn.clone(),
            module_fqn.clone(),
            file_path.to_string(),
            module_span,
            Language::Python,
        ));
        ctx.record_definition(&module_fqn, &module_id, module_span);

        ctx.within_scope(&module_id, &module_fqn, |ctx| {
            walk_body(ctx, cst.root());
        });

        ctx.finish()
    }
}

fn module_fqn_from_path(file_path: &str) -> String {
    file_path
        .trim_end_matches(".py")
        .trim_end_matches(".pyi")
        .replace(['/', '\\'], ".")
}

fn walk_body(ctx: &mut GeneratorContext, node: TsNode) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_statement(ctx, child);
    }
}

fn walk_statement(ctx: &mut GeneratorContext, node: TsNode) {
    match node.kind() {
        "function_definition" => extract_function(ctx, node),
        "class_definition" => extract_class(ctx, node),
        "import_statement" | "import_from_statement" => extract_import(ctx, node),
        "expression_statement" => extract_assignment(ctx, node),
        "decorated_definition" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if matches!(child.kind(), "function_definition" | "class_definition") {
                    walk_statement(ctx, child);
                }
            }
        }
        "if_statement" | "try_statement" | "with_statement" | "for_statement" | "while_statement" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk_statement(ctx, child);
            }
        }
        "block" => walk_body(ctx, node),
        _ => record_identifier_references(ctx, node),
    }
}

fn extract_function(ctx: &mut GeneratorContext, node: TsNode) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = ctx.cst.node_text(&name_node).to_string();
    let span = ts_to_span(&node);
    let fqn = ctx.fqn(&name);

    let is_method = ctx
        .scope_stack
        .last()
        .map(|s| s.chars().next().map(char::is_uppercase).unwrap_or(false))
        .unwrap_or(false);
    let kind = if is_method { NodeKind::Method } else { NodeKind::Function };

    let node_id = ctx.node_id(kind, &fqn, span);
    let is_async = node.child(0).map(|c| c.kind() == "async").unwrap_or(false);

    let mut ir_node = Node::new(node_id.clone(), kind, fqn.clone(), name.clone(), ctx.file_path.clone(), span, Language::Python);
    ir_node.attrs.insert("is_async".into(), serde_json::json!(is_async));
    if let Some(doc) = docstring(ctx, &node) {
        ir_node.attrs.insert("docstring".into(), serde_json::json!(doc));
    }
    if let Some(parent) = ctx.parent_id.clone() {
        ir_node = ir_node.with_parent(parent);
    }

    ctx.add_node(ir_node);
    ctx.emit_contains(&node_id);
    ctx.record_definition(&fqn, &node_id, span);

    ctx.within_scope(&node_id, &name, |ctx| {
        ctx.clear_local_values();
        if let Some(params) = node.child_by_field_name("parameters") {
            extract_parameters(ctx, params, &node_id);
        }
        if let Some(body) = node.child_by_field_name("body") {
            walk_body(ctx, body);
            build_function_cfg(ctx, &node_id, &fqn, span, body);
        }
    });
}

/// Walks a function body's CST to emit its control-flow blocks/edges
/// (§4.4): an entry block, a join/exit topology around each `if`/`for`/
/// `while`/`try` statement, and an exit block every path reaches. Plain
/// statement runs between control-flow constructs share the enclosing
/// block rather than getting one block each — the builder doesn't impose
/// per-statement granularity, only per-control-flow-construct.
fn build_function_cfg(ctx: &mut GeneratorContext, func_id: &str, func_fqn: &str, func_span: Span, body: TsNode) {
    let mut builder = CfgBuilder::new(func_id, func_fqn, &ctx.file_path, Language::Python);
    let entry = builder.add_block(BlockKind::Entry, Span::new(func_span.start_line, func_span.start_col, func_span.start_line, func_span.start_col));
    let last = walk_cfg_block(&mut builder, body, entry);
    let exit = builder.add_block(BlockKind::Exit, Span::new(func_span.end_line, func_span.end_col, func_span.end_line, func_span.end_col));
    builder.connect(&last, &exit, CfgEdgeKind::Normal);
    let (blocks, edges) = builder.finish();
    ctx.doc.nodes.extend(blocks);
    ctx.doc.edges.extend(edges);
}

/// Processes the statements of one block-shaped CST node (a function/if/
/// loop/try body) in order, threading `current` (the block CFG control
/// reaches this point from) through each control-flow construct.  Returns
/// the block control reaches after the last statement.
fn walk_cfg_block(builder: &mut CfgBuilder, container: TsNode, mut current: String) -> String {
    let mut cursor = container.walk();
    for stmt in container.named_children(&mut cursor) {
        current = match stmt.kind() {
            "if_statement" => walk_cfg_if(builder, stmt, current),
            "for_statement" | "while_statement" => walk_cfg_loop(builder, stmt, current),
            "try_statement" => walk_cfg_try(builder, stmt, current),
            _ => current,
        };
    }
    current
}

fn walk_cfg_if(builder: &mut CfgBuilder, stmt: TsNode, current: String) -> String {
    let span = ts_to_span(&stmt);
    let branch = builder.add_block(BlockKind::Branch, span);
    builder.connect(&current, &branch, CfgEdgeKind::Normal);

    let true_end = match stmt.child_by_field_name("consequence") {
        Some(consequence) => {
            let true_block = builder.add_block(BlockKind::Normal, ts_to_span(&consequence));
            builder.connect(&branch, &true_block, CfgEdgeKind::TrueBranch);
            walk_cfg_block(builder, consequence, true_block)
        }
        None => branch.clone(),
    };

    let false_end = match stmt.child_by_field_name("alternative") {
        Some(alt) if alt.kind() == "elif_clause" => walk_cfg_elif(builder, alt, &branch),
        Some(alt) if alt.kind() == "else_clause" => match alt.child_by_field_name("body") {
            Some(else_body) => {
                let false_block = builder.add_block(BlockKind::Normal, ts_to_span(&else_body));
                builder.connect(&branch, &false_block, CfgEdgeKind::FalseBranch);
                walk_cfg_block(builder, else_body, false_block)
            }
            None => branch.clone(),
        },
        _ => branch.clone(),
    };

    let join = builder.add_block(BlockKind::Normal, span);
    builder.connect(&true_end, &join, CfgEdgeKind::Normal);
    if false_end == branch {
        builder.connect(&branch, &join, CfgEdgeKind::FalseBranch);
    } else {
        builder.connect(&false_end, &join, CfgEdgeKind::Normal);
    }
    join
}

/// `elif` is just a nested `if` living in the parent's `alternative` slot;
/// tree-sitter-python's grammar gives it the same `condition`/
/// `consequence`/`alternative` fields as `if_statement`; this reuses
/// `walk_cfg_if`'s shape without needing a separate return-edge dance
/// since the elif's own join becomes the false-path result here.
fn walk_cfg_elif(builder: &mut CfgBuilder, elif: TsNode, branch: &str) -> String {
    let span = ts_to_span(&elif);
    let inner_branch = builder.add_block(BlockKind::Branch, span);
    builder.connect(branch, &inner_branch, CfgEdgeKind::FalseBranch);

    let true_end = match elif.child_by_field_name("consequence") {
        Some(consequence) => {
            let true_block = builder.add_block(BlockKind::Normal, ts_to_span(&consequence));
            builder.connect(&inner_branch, &true_block, CfgEdgeKind::TrueBranch);
            walk_cfg_block(builder, consequence, true_block)
        }
        None => inner_branch.clone(),
    };

    let false_end = match elif.child_by_field_name("alternative") {
        Some(alt) if alt.kind() == "elif_clause" => walk_cfg_elif(builder, alt, &inner_branch),
        Some(alt) if alt.kind() == "else_clause" => match alt.child_by_field_name("body") {
            Some(else_body) => {
                let false_block = builder.add_block(BlockKind::Normal, ts_to_span(&else_body));
                builder.connect(&inner_branch, &false_block, CfgEdgeKind::FalseBranch);
                walk_cfg_block(builder, else_body, false_block)
            }
            None => inner_branch.clone(),
        },
        _ => inner_branch.clone(),
    };

    let join = builder.add_block(BlockKind::Normal, span);
    builder.connect(&true_end, &join, CfgEdgeKind::Normal);
    if false_end == inner_branch {
        builder.connect(&inner_branch, &join, CfgEdgeKind::FalseBranch);
    } else {
        builder.connect(&false_end, &join, CfgEdgeKind::Normal);
    }
    join
}

fn walk_cfg_loop(builder: &mut CfgBuilder, stmt: TsNode, current: String) -> String {
    let span = ts_to_span(&stmt);
    let loop_block = builder.add_block(BlockKind::Loop, span);
    builder.connect(&current, &loop_block, CfgEdgeKind::Normal);

    if let Some(body) = stmt.child_by_field_name("body") {
        let body_end = walk_cfg_block(builder, body, loop_block.clone());
        builder.connect(&body_end, &loop_block, CfgEdgeKind::Normal);
    }

    let after = builder.add_block(BlockKind::Normal, span);
    builder.connect(&loop_block, &after, CfgEdgeKind::Normal);
    after
}

fn walk_cfg_try(builder: &mut CfgBuilder, stmt: TsNode, current: String) -> String {
    let span = ts_to_span(&stmt);
    let try_block = builder.add_block(BlockKind::TryCatch, span);
    builder.connect(&current, &try_block, CfgEdgeKind::Normal);

    let try_end = match stmt.child_by_field_name("body") {
        Some(body) => walk_cfg_block(builder, body, try_block.clone()),
        None => try_block.clone(),
    };

    let mut except_ends = Vec::new();
    let mut cursor = stmt.walk();
    for clause in stmt.named_children(&mut cursor) {
        if clause.kind() != "except_clause" {
            continue;
        }
        let except_block = builder.add_block(BlockKind::TryCatch, ts_to_span(&clause));
        builder.connect(&try_block, &except_block, CfgEdgeKind::Exception);
        let except_end = clause.child_by_field_name("body").map(|b| walk_cfg_block(builder, b, except_block.clone())).unwrap_or(except_block);
        except_ends.push(except_end);
    }

    let join = builder.add_block(BlockKind::Normal, span);
    builder.connect(&try_end, &join, CfgEdgeKind::Normal);
    for end in &except_ends {
        builder.connect(end, &join, CfgEdgeKind::Normal);
    }
    join
}

fn extract_parameters(ctx: &mut GeneratorContext, params: TsNode, func_id: &str) {
    let mut cursor = params.walk();
    for child in params.children(&mut cursor) {
        let name_node = match child.kind() {
            "identifier" => Some(child),
            "typed_parameter" | "default_parameter" | "typed_default_parameter" => child.child(0),
            _ => None,
        };
        let Some(name_node) = name_node else { continue };
        if name_node.kind() != "identifier" {
            continue;
        }
        let name = ctx.cst.node_text(&name_node).to_string();
        let span = ts_to_span(&name_node);
        let fqn = ctx.fqn(&name);
        let node_id = ctx.node_id(NodeKind::Parameter, &fqn, span);
        let mut node = Node::new(node_id.clone(), NodeKind::Parameter, fqn.clone(), name.clone(), ctx.file_path.clone(), span, Language::Python)
            .with_parent(func_id.to_string());
        if matches!(child.kind(), "typed_parameter" | "typed_default_parameter") {
            if let Some(annotation) = child.child_by_field_name("type") {
                node.attrs.insert("type_annotation".into(), serde_json::json!(ctx.cst.node_text(&annotation)));
            }
        }
        ctx.add_node(node);
        ctx.record_definition(&fqn, &node_id, span);
        ctx.bind_value(&name, &node_id);
    }
}

fn extract_class(ctx: &mut GeneratorContext, node: TsNode) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = ctx.cst.node_text(&name_node).to_string();
    let span = ts_to_span(&node);
    let fqn = ctx.fqn(&name);
    let node_id = ctx.node_id(NodeKind::Class, &fqn, span);

    let mut ir_node = Node::new(node_id.clone(), NodeKind::Class, fqn.clone(), name.clone(), ctx.file_path.clone(), span, Language::Python);
    if let Some(doc) = docstring(ctx, &node) {
        ir_node.attrs.insert("docstring".into(), serde_json::json!(doc));
    }
    if let Some(parent) = ctx.parent_id.clone() {
        ir_node = ir_node.with_parent(parent);
    }
    ctx.add_node(ir_node);
    ctx.emit_contains(&node_id);
    ctx.record_definition(&fqn, &node_id, span);

    if let Some(bases) = node.child_by_field_name("superclasses") {
        let mut cursor = bases.walk();
        for base in bases.children(&mut cursor) {
            if base.kind() == "identifier" {
                let base_name = ctx.cst.node_text(&base).to_string();
                let edge_id = ctx.edge_id(EdgeKind::Inherits, &node_id, &base_name);
                ctx.add_edge(crate::model::Edge::new(edge_id, EdgeKind::Inherits, node_id.clone(), base_name.clone()));
                ctx.record_reference(&base_name, ts_to_span(&base));
            }
        }
    }

    ctx.within_scope(&node_id, &name, |ctx| {
        if let Some(body) = node.child_by_field_name("body") {
            walk_body(ctx, body);
        }
    });
}

fn extract_import(ctx: &mut GeneratorContext, node: TsNode) {
    let span = ts_to_span(&node);
    let module_name = if node.kind() == "import_statement" {
        node.child_by_field_name("name")
            .map(|n| ctx.cst.node_text(&n).to_string())
            .unwrap_or_else(|| ctx.cst.node_text(&node).to_string())
    } else {
        node.child_by_field_name("module_name")
            .map(|n| ctx.cst.node_text(&n).to_string())
            .unwrap_or_else(|| ctx.cst.node_text(&node).to_string())
    };
    let fqn = format!("import:{module_name}");
    let node_id = ctx.node_id(NodeKind::Import, &fqn, span);
    let mut ir_node = Node::new(node_id.clone(), NodeKind::Import, fqn, module_name.clone(), ctx.file_path.clone(), span, Language::Python);
    ir_node.attrs.insert("module".into(), serde_json::json!(module_name));
    ir_node.attrs.insert("raw".into(), serde_json::json!(ctx.cst.node_text(&node)));
    ir_node.attrs.insert("bindings".into(), serde_json::json!(import_bindings(ctx, &node, &module_name)));
    if let Some(parent) = ctx.parent_id.clone() {
        ir_node = ir_node.with_parent(parent);
    }
    ctx.add_node(ir_node);
    ctx.emit_contains(&node_id);
}

/// Resolves the local name each clause of an import statement binds, to
/// `target_fqn`, for the resolver's alias table (§4.3):
///   `import foo.bar`            → foo.bar -> foo.bar
///   `import foo.bar as fb`      → fb -> foo.bar
///   `from foo import bar`       → bar -> foo.bar
///   `from foo import bar as b`  → b -> foo.bar
fn import_bindings(ctx: &GeneratorContext, node: &TsNode, module_name: &str) -> Vec<(String, String)> {
    let mut bindings = Vec::new();
    if node.kind() == "import_statement" {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "dotted_name" => {
                    let name = ctx.cst.node_text(&child).to_string();
                    bindings.push((name.clone(), name));
                }
                "aliased_import" => {
                    let name_node = child.child_by_field_name("name");
                    let alias_node = child.child_by_field_name("alias");
                    if let (Some(name_node), Some(alias_node)) = (name_node, alias_node) {
                        let target = ctx.cst.node_text(&name_node).to_string();
                        let alias = ctx.cst.node_text(&alias_node).to_string();
                        bindings.push((alias, target));
                    }
                }
                _ => {}
            }
        }
    } else {
        let module_start = node.child_by_field_name("module_name").map(|m| m.start_byte());
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "dotted_name" if Some(child.start_byte()) != module_start => {
                    let name = ctx.cst.node_text(&child).to_string();
                    bindings.push((name.clone(), format!("{module_name}.{name}")));
                }
                "aliased_import" => {
                    let name_node = child.child_by_field_name("name");
                    let alias_node = child.child_by_field_name("alias");
                    if let (Some(name_node), Some(alias_node)) = (name_node, alias_node) {
                        let imported = ctx.cst.node_text(&name_node).to_string();
                        let alias = ctx.cst.node_text(&alias_node).to_string();
                        bindings.push((alias, format!("{module_name}.{imported}")));
                    }
                }
                _ => {}
            }
        }
    }
    bindings
}

fn extract_assignment(ctx: &mut GeneratorContext, node: TsNode) {
    let Some(assignment) = node.child(0) else { return };
    if assignment.kind() == "call" {
        extract_call(ctx, assignment);
        return;
    }
    if assignment.kind() != "assignment" {
        record_identifier_references(ctx, node);
        return;
    }
    let Some(left) = assignment.child_by_field_name("left") else { return };
    if left.kind() != "identifier" {
        return;
    }
    let name = ctx.cst.node_text(&left).to_string();
    let span = ts_to_span(&left);
    let fqn = ctx.fqn(&name);
    let kind = if name.chars().all(|c| c.is_uppercase() || c == '_') {
        NodeKind::Constant
    } else {
        NodeKind::Variable
    };
    let node_id = ctx.node_id(kind, &fqn, span);
    let mut ir_node = Node::new(node_id.clone(), kind, fqn.clone(), name.clone(), ctx.file_path.clone(), span, Language::Python);
    if let Some(parent) = ctx.parent_id.clone() {
        ir_node = ir_node.with_parent(parent);
    }
    ctx.add_node(ir_node);
    ctx.emit_contains(&node_id);
    ctx.record_definition(&fqn, &node_id, span);

    let right = assignment.child_by_field_name("right");
    let (value_id, value_base_type) = match right {
        Some(r) if r.kind() == "call" => match extract_call(ctx, r) {
            Some(info) => (Some(info.node_id), Some(info.base_type.unwrap_or(info.qualified_call))),
            None => (None, None),
        },
        Some(r) if r.kind() == "identifier" => {
            let read_name = ctx.cst.node_text(&r).to_string();
            (extract_read(ctx, &read_name, ts_to_span(&r)), None)
        }
        _ => (None, None),
    };

    let assign_fqn = ctx.fqn(&format!("assign:{name}"));
    let assign_id = ctx.node_id(NodeKind::Expression, &assign_fqn, span);
    let mut assign_node = Node::new(assign_id.clone(), NodeKind::Expression, assign_fqn, name.clone(), ctx.file_path.clone(), span, Language::Python);
    assign_node.attrs.insert("expr_kind".into(), serde_json::json!("assign"));
    assign_node.attrs.insert("read_name".into(), serde_json::json!(name));
    if let Some(base_type) = &value_base_type {
        assign_node.attrs.insert("base_type".into(), serde_json::json!(base_type));
    }
    if let Some(parent) = ctx.parent_id.clone() {
        assign_node = assign_node.with_parent(parent);
    }
    ctx.add_node(assign_node);
    ctx.emit_contains(&assign_id);

    if let Some(value_id) = &value_id {
        let edge_id = ctx.edge_id(EdgeKind::Dfg, value_id, &assign_id);
        ctx.add_edge(crate::model::Edge::new(edge_id, EdgeKind::Dfg, value_id.clone(), assign_id.clone()));
    }
    let edge_id = ctx.edge_id(EdgeKind::Dfg, &assign_id, &node_id);
    ctx.add_edge(crate::model::Edge::new(edge_id, EdgeKind::Dfg, assign_id.clone(), node_id.clone()));

    ctx.bind_value(&name, &node_id);
}

/// Extracts a `call` expression (`obj.method(args)` or `fn(args)`) as an
/// `Expression` node the TRCR matcher can project into a `Call` entity
/// (§4.4 → §4.5). `None` when the callee shape isn't one we recognize
/// (e.g. calling the result of another call) — we never guess a callee
/// we can't read off the syntax directly.
fn extract_call(ctx: &mut GeneratorContext, call: TsNode) -> Option<CallInfo> {
    let function = call.child_by_field_name("function")?;
    let (call_name, base_type, qualified_call) = match function.kind() {
        "identifier" => {
            let name = ctx.cst.node_text(&function).to_string();
            (name.clone(), None, name)
        }
        "attribute" => {
            let object = function.child_by_field_name("object")?;
            let attribute = function.child_by_field_name("attribute")?;
            let object_text = ctx.cst.node_text(&object).to_string();
            let attribute_text = ctx.cst.node_text(&attribute).to_string();
            (attribute_text.clone(), Some(object_text.clone()), format!("{object_text}.{attribute_text}"))
        }
        _ => return None,
    };

    let span = ts_to_span(&call);
    let fqn = ctx.fqn(&format!("call:{call_name}@{}", span.start_line));
    let node_id = ctx.node_id(NodeKind::Expression, &fqn, span);

    let arg_texts: Vec<String> = call
        .child_by_field_name("arguments")
        .map(|list| {
            let mut cursor = list.walk();
            list.named_children(&mut cursor).map(|arg| ctx.cst.node_text(&arg).to_string()).collect()
        })
        .unwrap_or_default();

    let mut ir_node = Node::new(node_id.clone(), NodeKind::Expression, fqn, call_name.clone(), ctx.file_path.clone(), span, Language::Python);
    ir_node.attrs.insert("expr_kind".into(), serde_json::json!("call"));
    ir_node.attrs.insert("call_name".into(), serde_json::json!(call_name));
    ir_node.attrs.insert("qualified_call".into(), serde_json::json!(qualified_call));
    if let Some(base_type) = &base_type {
        ir_node.attrs.insert("base_type".into(), serde_json::json!(base_type));
    }
    ir_node.attrs.insert("args".into(), serde_json::json!(arg_texts));
    if let Some(parent) = ctx.parent_id.clone() {
        ir_node = ir_node.with_parent(parent);
    }
    ctx.add_node(ir_node);
    ctx.emit_contains(&node_id);

    if let Some(list) = call.child_by_field_name("arguments") {
        let mut cursor = list.walk();
        for arg in list.named_children(&mut cursor) {
            if arg.kind() != "identifier" {
                continue;
            }
            let arg_name = ctx.cst.node_text(&arg).to_string();
            if let Some(source_id) = ctx.lookup_value(&arg_name) {
                let edge_id = ctx.edge_id(EdgeKind::Dfg, &source_id, &node_id);
                ctx.add_edge(crate::model::Edge::new(edge_id, EdgeKind::Dfg, source_id, node_id.clone()));
            }
        }
    }

    Some(CallInfo { node_id, base_type, qualified_call })
}

/// Extracts a bare-identifier read used as a value (an assignment's RHS) as
/// an `Expression` node the TRCR matcher can project into a `Read` entity.
/// Returns `None` when the name has no known local binding to chain from —
/// the node is still emitted, there's simply no upstream edge to draw.
fn extract_read(ctx: &mut GeneratorContext, name: &str, span: crate::span::Span) -> Option<String> {
    let fqn = ctx.fqn(&format!("read:{name}@{}", span.start_line));
    let node_id = ctx.node_id(NodeKind::Expression, &fqn, span);
    let mut ir_node = Node::new(node_id.clone(), NodeKind::Expression, fqn, name.to_string(), ctx.file_path.clone(), span, Language::Python);
    ir_node.attrs.insert("expr_kind".into(), serde_json::json!("read"));
    ir_node.attrs.insert("read_name".into(), serde_json::json!(name));
    if let Some(parent) = ctx.parent_id.clone() {
        ir_node = ir_node.with_parent(parent);
    }
    ctx.add_node(ir_node);
    ctx.emit_contains(&node_id);

    if let Some(source_id) = ctx.lookup_value(name) {
        let edge_id = ctx.edge_id(EdgeKind::Dfg, &source_id, &node_id);
        ctx.add_edge(crate::model::Edge::new(edge_id, EdgeKind::Dfg, source_id, node_id.clone()));
    }

    Some(node_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_registry::ParserRegistry;
    use crate::taint::extract_entities;

    fn generate(src: &str) -> IRDocument {
        let registry = ParserRegistry::new();
        let cst = registry.parse(src, Language::Python).unwrap();
        PythonGenerator.generate(&cst, "repo", "snap1", "app.py")
    }

    #[test]
    fn assignment_from_a_call_emits_call_and_assign_expressions() {
        let doc = generate("def handler():\n    query = input()\n    cursor.execute(query)\n");
        let entities = extract_entities(&doc.nodes);
        let calls: Vec<_> = entities.iter().filter(|e| e.kind == crate::model::EntityKind::Call).collect();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().any(|e| e.call_name.as_deref() == Some("input")));
        assert!(calls.iter().any(|e| e.call_name.as_deref() == Some("execute") && e.base_type.as_deref() == Some("cursor")));
        assert!(entities.iter().any(|e| e.kind == crate::model::EntityKind::Assign && e.read_name.as_deref() == Some("query")));
    }

    /// The value read by `input()` must reach `cursor.execute`'s call
    /// expression through an unbroken `Dfg` edge chain — the shape TRCR's
    /// existential path search walks for a source/sink round-trip.
    #[test]
    fn tainted_value_flows_from_source_call_to_sink_call() {
        let doc = generate("def handler():\n    query = input()\n    cursor.execute(query)\n");
        let input_call = doc.nodes.iter().find(|n| n.attrs.get("call_name").and_then(|v| v.as_str()) == Some("input")).unwrap();
        let execute_call = doc.nodes.iter().find(|n| n.attrs.get("call_name").and_then(|v| v.as_str()) == Some("execute")).unwrap();
        let query_var = doc.nodes.iter().find(|n| n.kind == NodeKind::Variable && n.name == "query").unwrap();

        assert!(doc.edges.iter().any(|e| e.kind == EdgeKind::Dfg && e.source_id == input_call.id && doc.nodes.iter().any(|n| n.id == e.target_id && n.attrs.get("expr_kind").and_then(|v| v.as_str()) == Some("assign"))));
        assert!(doc.edges.iter().any(|e| e.kind == EdgeKind::Dfg && e.target_id == query_var.id));
        assert!(doc.edges.iter().any(|e| e.kind == EdgeKind::Dfg && e.source_id == query_var.id && e.target_id == execute_call.id));
    }

    #[test]
    fn bare_call_statement_with_no_receiver_has_no_base_type() {
        let doc = generate("def f():\n    helper()\n");
        let entities = extract_entities(&doc.nodes);
        let call = entities.iter().find(|e| e.call_name.as_deref() == Some("helper")).unwrap();
        assert_eq!(call.base_type, None);
    }
}

fn docstring(ctx: &GeneratorContext, node: &TsNode) -> Option<String> {
    let body = node.child_by_field_name("body")?;
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let expr = first.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    Some(ctx.cst.node_text(&expr).trim_matches(['"', '\'']).to_string())
}

fn record_identifier_references(ctx: &mut GeneratorContext, node: TsNode) {
    if node.kind() == "identifier" {
        let name = ctx.cst.node_text(&node).to_string();
        ctx.record_reference(&name, ts_to_span(&node));
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        record_identifier_references(ctx, child);
    }
}
