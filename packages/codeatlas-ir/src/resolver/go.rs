//! Go reference resolution (§4.3): package-level exported identifiers
//! (capitalized names) are visible within the same module path; internal
//! packages are gated by path prefix.

use crate::model::{Node, NodeKind};
use crate::resolver::symbol_table::SymbolTable;

pub fn register_imports(table: &SymbolTable, file_path: &str, nodes: &[Node]) {
    for node in nodes.iter().filter(|n| n.kind == NodeKind::Import) {
        let (Some(path), Some(alias)) = (
            node.attrs.get("path").and_then(|v| v.as_str()),
            node.attrs.get("alias").and_then(|v| v.as_str()),
        ) else {
            continue;
        };
        table.register_alias(file_path, alias, path);
    }
}

/// `internal/` packages are only importable by code rooted at the module
/// path that contains the `internal` segment (the Go toolchain's own
/// visibility rule, reproduced here for the resolver).
pub fn is_visible(importer_module_path: &str, target_package_path: &str) -> bool {
    let Some(internal_idx) = target_package_path.find("/internal/").or_else(|| {
        if target_package_path.starts_with("internal/") {
            Some(0)
        } else {
            None
        }
    }) else {
        return true;
    };
    let root = &target_package_path[..internal_idx];
    importer_module_path == root || importer_module_path.starts_with(&format!("{root}/"))
}

pub fn resolve_reference(table: &SymbolTable, file_path: &str, package_name: &str, name: &str) -> Option<String> {
    if !name.chars().next().map(char::is_uppercase).unwrap_or(false) {
        let local = format!("{package_name}.{name}");
        return table.contains(&local).then_some(local);
    }
    if let Some(package_path) = table.resolve_alias(file_path, name.split('.').next().unwrap_or(name)) {
        let rest = name.splitn(2, '.').nth(1).unwrap_or(name);
        let candidate = format!("{package_path}.{rest}");
        if table.contains(&candidate) {
            return Some(candidate);
        }
    }
    let local = format!("{package_name}.{name}");
    table.contains(&local).then_some(local)
}
