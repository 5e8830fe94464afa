//! Parser Registry (§4.1): extension → language → parser instance, both
//! lazily populated on first use. Never raises on malformed input —
//! downstream consumers honor `Cst::is_partial` and degrade gracefully.

pub mod cst;
pub mod language;

pub use cst::{ts_to_span, Cst};

use crate::model::Language;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tree_sitter::Parser;

/// Per-language tree-sitter `Parser` is not `Sync`, so each language gets a
/// mutex-guarded slot; the registry itself is safe to share across the
/// rayon worker pool that parses files in parallel (§4.1, §5).
pub struct ParserRegistry {
    parsers: DashMap<Language, Arc<Mutex<Parser>>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self {
            parsers: DashMap::new(),
        }
    }

    pub fn language_for_path(&self, path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?;
        Language::from_extension(ext)
    }

    fn parser_for(&self, language: Language) -> Arc<Mutex<Parser>> {
        self.parsers
            .entry(language)
            .or_insert_with(|| {
                let mut parser = Parser::new();
                parser
                    .set_language(language.tree_sitter_language())
                    .expect("grammar is compiled against the tree-sitter version in use");
                Arc::new(Mutex::new(parser))
            })
            .clone()
    }

    /// Parses source text for `language`. Malformed input never produces an
    /// `Err`; it produces a `Cst` with `is_partial=true` and a non-zero
    /// `error_count`, same as any other source file.
    pub fn parse(&self, source: &str, language: Language) -> Option<Cst> {
        let parser = self.parser_for(language);
        let mut guard = parser.lock();
        let tree = guard.parse(source, None)?;
        drop(guard);
        Some(Cst::new(tree, source.to_string(), language))
    }

    pub fn parse_path(&self, path: &Path, source: &str) -> Option<Cst> {
        let language = self.language_for_path(path)?;
        self.parse(source, language)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_python() {
        let registry = ParserRegistry::new();
        let cst = registry.parse("def f():\n    return 1\n", Language::Python).unwrap();
        assert!(!cst.is_partial);
        assert_eq!(cst.error_count, 0);
    }

    #[test]
    fn malformed_input_is_partial_not_an_error() {
        let registry = ParserRegistry::new();
        let cst = registry.parse("def f(:\n", Language::Python).unwrap();
        assert!(cst.is_partial);
        assert!(cst.error_count > 0);
    }

    #[test]
    fn reuses_cached_parser_across_calls() {
        let registry = ParserRegistry::new();
        registry.parse("x = 1", Language::Python);
        registry.parse("y = 2", Language::Python);
        assert_eq!(registry.parsers.len(), 1);
    }
}
