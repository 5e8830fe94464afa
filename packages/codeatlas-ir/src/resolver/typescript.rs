//! TypeScript/JavaScript reference resolution (§4.3): walk named/default/
//! re-exports; resolve barrel (`index.ts`) re-exports transitively.

use crate::model::{Node, NodeKind};
use crate::resolver::symbol_table::SymbolTable;
use std::collections::HashSet;

pub fn register_imports(table: &SymbolTable, file_path: &str, nodes: &[Node]) {
    for node in nodes.iter().filter(|n| n.kind == NodeKind::Import) {
        let Some(source) = node.attrs.get("source").and_then(|v| v.as_str()) else { continue };
        let Some(bindings) = node.attrs.get("bindings").and_then(|v| v.as_array()) else { continue };
        for pair in bindings {
            let Some(pair) = pair.as_array() else { continue };
            let (Some(local), Some(imported)) = (pair.first().and_then(|v| v.as_str()), pair.get(1).and_then(|v| v.as_str())) else { continue };
            let target = if imported.is_empty() {
                resolve_module_path(file_path, source)
            } else {
                format!("{}.{}", resolve_module_path(file_path, source), imported)
            };
            table.register_alias(file_path, local, target);
        }
    }
}

/// Resolves a relative import specifier against the importing file's
/// directory, the only path shape the barrel walk below needs to follow.
fn resolve_module_path(from_file: &str, source: &str) -> String {
    if !source.starts_with('.') {
        return source.to_string();
    }
    let mut parts: Vec<&str> = from_file.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("").split('/').filter(|s| !s.is_empty()).collect();
    for segment in source.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Follows a chain of barrel re-exports (`export * from './x'` /
/// `export { y } from './x'`) until it reaches a non-barrel definition or
/// a cycle, returning the final resolved FQN if any.
pub fn resolve_through_barrels(table: &SymbolTable, start_fqn: &str, max_hops: usize) -> Option<String> {
    let mut current = start_fqn.to_string();
    let mut seen = HashSet::new();
    for _ in 0..max_hops {
        if table.contains(&current) {
            return Some(current);
        }
        if !seen.insert(current.clone()) {
            return None; // cycle
        }
        let Some((module, name)) = current.rsplit_once('.') else { return None };
        let reexports = table.symbols_in_file(&format!("{module}/index.ts"));
        let hit = reexports.iter().find(|s| s.fqn.ends_with(&format!(".{name}")) || s.fqn == name);
        match hit {
            Some(sym) => current = sym.fqn.clone(),
            None => return None,
        }
    }
    None
}

pub fn resolve_reference(table: &SymbolTable, file_path: &str, name: &str) -> Option<String> {
    if let Some(target) = table.resolve_alias(file_path, name) {
        if let Some(resolved) = resolve_through_barrels(table, &target, 8) {
            return Some(resolved);
        }
    }
    if table.contains(name) {
        return Some(name.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Symbol, SymbolKind};
    use crate::span::Span;

    #[test]
    fn resolves_relative_sibling_path() {
        assert_eq!(resolve_module_path("src/app.ts", "./utils"), "src/utils");
    }

    #[test]
    fn resolves_parent_relative_path() {
        assert_eq!(resolve_module_path("src/components/App.ts", "../utils"), "src/utils");
    }

    /// `import { Button } from './components'` where `components/index.ts`
    /// re-exports `Button` from its actual file resolves through the
    /// barrel to the re-export's recorded FQN, not the bare import target.
    #[test]
    fn import_resolves_through_a_barrel_reexport() {
        let table = SymbolTable::new();
        table.insert(Symbol::new("src/components/Button.Button", "src/components/index.ts", Span::zero(), SymbolKind::Function));
        table.register_alias("src/app.ts", "Button", "src/components.Button");

        let resolved = resolve_reference(&table, "src/app.ts", "Button");
        assert_eq!(resolved.as_deref(), Some("src/components/Button.Button"));
    }

    /// An import with no barrel re-export and no direct alias falls back
    /// to a bare-name lookup in the global symbol table.
    #[test]
    fn unresolved_alias_falls_back_to_direct_name_lookup() {
        let table = SymbolTable::new();
        table.insert(Symbol::new("Widget", "src/widget.ts", Span::zero(), SymbolKind::Class));

        let resolved = resolve_reference(&table, "src/app.ts", "Widget");
        assert_eq!(resolved.as_deref(), Some("Widget"));
    }

    #[test]
    fn reference_with_no_alias_and_no_global_symbol_is_unresolved() {
        let table = SymbolTable::new();
        assert_eq!(resolve_reference(&table, "src/app.ts", "Nothing"), None);
    }
}
