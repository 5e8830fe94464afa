//! Taint Rule Compiler & Matcher (§4.5): loads declarative YAML atom
//! files, compiles them into indexed `AtomRule`s, and matches them
//! against IR `Entity` projections to classify sources, sinks,
//! sanitizers, and propagators.

pub mod candidate;
pub mod entities;
pub mod matcher;
pub mod normalizer;
pub mod rule;
pub mod tier;
pub mod yaml;

pub use candidate::{CachePolicy, CandidateGenerator, CandidatePlan, PlanError};
pub use entities::extract_entities;
pub use matcher::{AtomMatch, MatchStatus, Matcher};
pub use normalizer::{NormalizationConfig, TypeNormalizer};
pub use rule::{AtomKind, AtomRule, CompileError, CompiledClause, RuleCompiler};
pub use tier::{MatchClause, Tier};
pub use yaml::{load_atom_file, AtomFile, RawAtom, RawMatchClause, YamlLoadError};

/// Compiles every atom in a YAML atom file in one pass, short-circuiting
/// on the first compile error so a malformed rule file never silently
/// drops rules.
pub fn compile_atom_file(text: &str, normalizer: TypeNormalizer) -> Result<Vec<AtomRule>, AtomFileError> {
    let file = load_atom_file(text).map_err(AtomFileError::Yaml)?;
    let compiler = RuleCompiler::new(normalizer);
    file.atoms.iter().map(|raw| compiler.compile(raw).map_err(AtomFileError::Compile)).collect()
}

#[derive(Debug, thiserror::Error)]
pub enum AtomFileError {
    #[error(transparent)]
    Yaml(#[from] YamlLoadError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}
