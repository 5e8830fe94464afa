//! Process-wide symbol table over all files of a snapshot (§4.3).
//!
//! DashMap-backed so structural generation (rayon, one task per file) and
//! symbol collection can overlap; conflicting definitions for the same FQN
//! are reported as diagnostics, never silently overwritten — first
//! lexicographically by file path wins (§4.3 "Conflicts").

use crate::diagnostics::Diagnostic;
use crate::model::Symbol;
use dashmap::DashMap;
use std::sync::Arc;

pub struct SymbolTable {
    by_fqn: DashMap<String, Arc<Symbol>>,
    by_file: DashMap<String, Vec<String>>,
    by_name: DashMap<String, Vec<String>>,
    /// (file_path, alias) → target FQN, for import-alias resolution
    /// (`import numpy as np`, `import * as Utils from './utils'`).
    aliases: DashMap<(String, String), String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            by_fqn: DashMap::new(),
            by_file: DashMap::new(),
            by_name: DashMap::new(),
            aliases: DashMap::new(),
        }
    }

    /// Inserts a definition, reporting (and keeping) the first definition
    /// lexicographically by file path when a conflict occurs.
    pub fn insert(&self, symbol: Symbol) -> Option<Diagnostic> {
        let fqn = symbol.fqn.clone();
        let file = symbol.definition_file.clone();
        let name = fqn.rsplit('.').next().unwrap_or(&fqn).to_string();

        let diagnostic = match self.by_fqn.get(&fqn) {
            Some(existing) if existing.definition_file != file => {
                let (kept_file, dropped_file) = if existing.definition_file <= file {
                    (existing.definition_file.clone(), file.clone())
                } else {
                    (file.clone(), existing.definition_file.clone())
                };
                Some(Diagnostic::resolver_conflict(dropped_file, &fqn, &kept_file))
            }
            _ => None,
        };

        let should_insert = match self.by_fqn.get(&fqn) {
            Some(existing) => file < existing.definition_file,
            None => true,
        };
        if should_insert {
            self.by_fqn.insert(fqn.clone(), Arc::new(symbol));
            self.by_file.entry(file).or_default().push(fqn.clone());
            self.by_name.entry(name).or_default().push(fqn);
        }

        diagnostic
    }

    pub fn get(&self, fqn: &str) -> Option<Arc<Symbol>> {
        self.by_fqn.get(fqn).map(|v| v.clone())
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.by_fqn.contains_key(fqn)
    }

    pub fn by_name(&self, name: &str) -> Vec<String> {
        self.by_name.get(name).map(|v| v.clone()).unwrap_or_default()
    }

    pub fn symbols_in_file(&self, file_path: &str) -> Vec<Arc<Symbol>> {
        self.by_file
            .get(file_path)
            .map(|fqns| fqns.iter().filter_map(|fqn| self.get(fqn)).collect())
            .unwrap_or_default()
    }

    pub fn register_alias(&self, file_path: impl Into<String>, alias: impl Into<String>, target_fqn: impl Into<String>) {
        self.aliases.insert((file_path.into(), alias.into()), target_fqn.into());
    }

    pub fn resolve_alias(&self, file_path: &str, alias: &str) -> Option<String> {
        self.aliases.get(&(file_path.to_string(), alias.to_string())).map(|v| v.clone())
    }

    pub fn len(&self) -> usize {
        self.by_fqn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_fqn.is_empty()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    fn sym(fqn: &str, file: &str) -> Symbol {
        Symbol::new(fqn, file, Span::zero(), SymbolKind::Function)
    }

    #[test]
    fn first_lexicographic_file_wins_on_conflict() {
        let table = SymbolTable::new();
        assert!(table.insert(sym("pkg.f", "b.py")).is_none());
        let diag = table.insert(sym("pkg.f", "a.py")).expect("conflict reported");
        assert_eq!(table.get("pkg.f").unwrap().definition_file, "a.py");
        assert_eq!(diag.file_path, "b.py");
    }

    #[test]
    fn no_diagnostic_when_second_insert_loses() {
        let table = SymbolTable::new();
        table.insert(sym("pkg.f", "a.py"));
        let diag = table.insert(sym("pkg.f", "z.py")).unwrap();
        assert_eq!(table.get("pkg.f").unwrap().definition_file, "a.py");
        assert_eq!(diag.file_path, "z.py");
    }
}
