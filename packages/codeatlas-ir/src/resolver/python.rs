//! Python reference resolution (§4.3): walk `import`, `from … import`,
//! `import … as`; package `__init__` files additionally honor the
//! re-export list carried in `Node.attrs["bindings"]`.

use crate::model::{Node, NodeKind};
use crate::resolver::symbol_table::SymbolTable;

/// Registers every binding an import node introduces into the per-file
/// alias scope of `table`, so `resolve` can later turn `np.array` into
/// `numpy.array` without re-walking the CST.
pub fn register_imports(table: &SymbolTable, file_path: &str, nodes: &[Node]) {
    for node in nodes.iter().filter(|n| n.kind == NodeKind::Import) {
        let Some(bindings) = node.attrs.get("bindings").and_then(|v| v.as_array()) else { continue };
        for pair in bindings {
            let Some(pair) = pair.as_array() else { continue };
            let (Some(local), Some(target)) = (pair.first().and_then(|v| v.as_str()), pair.get(1).and_then(|v| v.as_str())) else { continue };
            table.register_alias(file_path, local, target);
        }
    }
}

/// Resolves a bare reference name seen in `file_path` to a fully-qualified
/// symbol, trying (in order): an import alias bound in this file, the
/// module-local FQN, then a bare top-level FQN. Returns `None` rather than
/// guessing when nothing matches (§4.3 "Unresolved references remain
/// unresolved").
pub fn resolve_reference(table: &SymbolTable, file_path: &str, module_fqn: &str, name: &str) -> Option<String> {
    if let Some(target) = table.resolve_alias(file_path, name) {
        if table.contains(&target) {
            return Some(target);
        }
    }
    let local = format!("{module_fqn}.{name}");
    if table.contains(&local) {
        return Some(local);
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
    fn resolves_aliased_import() {
        let table = SymbolTable::new();
        table.insert(Symbol::new("numpy", "numpy/__init__.py", Span::zero(), SymbolKind::Module));
        table.register_alias("main.py", "np", "numpy");
        assert_eq!(resolve_reference(&table, "main.py", "main", "np"), Some("numpy".to_string()));
    }

    #[test]
    fn falls_back_to_module_local_fqn() {
        let table = SymbolTable::new();
        table.insert(Symbol::new("pkg.mod.helper", "pkg/mod.py", Span::zero(), SymbolKind::Function));
        assert_eq!(resolve_reference(&table, "pkg/mod.py", "pkg.mod", "helper"), Some("pkg.mod.helper".to_string()));
    }

    #[test]
    fn unresolved_reference_stays_unresolved() {
        let table = SymbolTable::new();
        assert_eq!(resolve_reference(&table, "main.py", "main", "ghost"), None);
    }
}
