//! Structural IR Generator (§4.2): one implementation per language. Walks
//! the CST, emits `Node`s for declarations and `Edge`s for structural
//! relations, and `Occurrence`s for every identifier token that references a
//! declaration. Scope resolution here is lexical only; cross-file
//! resolution is deferred to the resolver.

mod context;
pub mod go;
pub mod python;
pub mod typescript;

pub use context::GeneratorContext;

use crate::model::IRDocument;
use crate::parser_registry::Cst;

/// One per supported language. Implementations must be deterministic:
/// given identical CST content, two runs (in any order, on any machine)
/// produce bitwise identical `IRDocument`s (§4.2 "stable IDs").
pub trait StructuralGenerator: Send + Sync {
    fn generate(&self, cst: &Cst, repo_id: &str, snapshot_id: &str, file_path: &str) -> IRDocument;
}

pub fn generator_for(language: crate::model::Language) -> Box<dyn StructuralGenerator> {
    use crate::model::Language;
    match language {
        Language::Python => Box::new(python::PythonGenerator),
        Language::TypeScript | Language::JavaScript => Box::new(typescript::TypeScriptGenerator),
        Language::Go => Box::new(go::GoGenerator),
    }
}
