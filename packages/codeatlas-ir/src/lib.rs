//! codeatlas-ir: the Layered IR Builder, Taint Rule Compiler & Matcher
//! (TRCR), and Query Engine of the code-intelligence core (§2).
//!
//! Dependency order, leaves first: `parser_registry` → `structural` →
//! `resolver` → `semantic` → `taint` → `query`, with `interproc` sitting
//! beside `query` to connect source/sink matches across function
//! boundaries. `model` is the shared vocabulary every layer builds on.

pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod interproc;
pub mod model;
pub mod parser_registry;
pub mod query;
pub mod resolver;
pub mod semantic;
pub mod span;
pub mod structural;
pub mod taint;

use config::Config;
use diagnostics::Diagnostic;
use model::{Entity, IRDocument};
use parser_registry::ParserRegistry;
use std::path::Path;
use taint::{AtomMatch, AtomRule, Matcher};

/// A single file handed to the pipeline: its repo-relative path and raw
/// source text. The caller reads the filesystem; the pipeline never does
/// I/O itself (§5 "Suspension points").
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

/// End-to-end build result for one snapshot: the per-file documents after
/// cross-file resolution and semantic enrichment, the taint matches found
/// against them, and every diagnostic raised along the way (skipped
/// files, resolver conflicts, parse failures).
pub struct BuildResult {
    pub documents: Vec<IRDocument>,
    pub matches: Vec<AtomMatch>,
    pub skipped_files: Vec<Diagnostic>,
}

/// Ties the Layered IR Builder's stages together: Parser Registry →
/// Structural IR Generator → Cross-file Resolver → Semantic IR Builder
/// (§2 "Data flow"). Taint rule compilation is decoupled from document
/// building — rules are compiled once and matched against however many
/// snapshots are built.
pub struct Pipeline {
    config: Config,
    parser_registry: ParserRegistry,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config, parser_registry: ParserRegistry::new() }
    }

    /// Builds one snapshot's IR from a batch of source files. Per-file
    /// parsing and structural generation run in parallel (§5 "Scheduling
    /// model"); cross-file resolution and semantic enrichment run
    /// single-threaded over the complete per-file set, since the
    /// resolver requires every document up front.
    pub fn build(&self, repo_id: &str, snapshot_id: &str, files: &[SourceFile], rules: &[AtomRule]) -> BuildResult {
        use rayon::prelude::*;

        let (mut documents, skipped_files): (Vec<IRDocument>, Vec<Diagnostic>) = files
            .par_iter()
            .map(|file| self.build_one_file(repo_id, snapshot_id, file))
            .fold(
                || (Vec::new(), Vec::new()),
                |(mut docs, mut skipped), outcome| {
                    match outcome {
                        Ok(doc) => docs.push(doc),
                        Err(diagnostic) => skipped.push(diagnostic),
                    }
                    (docs, skipped)
                },
            )
            .reduce(
                || (Vec::new(), Vec::new()),
                |(mut docs_a, mut skipped_a), (docs_b, skipped_b)| {
                    docs_a.extend(docs_b);
                    skipped_a.extend(skipped_b);
                    (docs_a, skipped_a)
                },
            );

        let table = resolver::build_symbol_table(&mut documents);
        resolver::resolve_references(&mut documents, &table);

        for doc in &mut documents {
            semantic::build_semantic_layer(doc, self.config.enable_ssa);
            doc.canonicalize();
        }

        let matcher = Matcher::new(rules.to_vec());
        let entities: Vec<Entity> = documents.iter().flat_map(|doc| taint::extract_entities(&doc.nodes)).collect();
        let matches = matcher.match_entities(&entities);

        BuildResult { documents, matches, skipped_files }
    }

    fn build_one_file(&self, repo_id: &str, snapshot_id: &str, file: &SourceFile) -> Result<IRDocument, Diagnostic> {
        if file.content.len() as u64 > self.config.max_file_size_bytes {
            return Err(Diagnostic::new(
                diagnostics::DiagnosticKind::SkippedFileTooLarge,
                diagnostics::Severity::Warning,
                file.path.clone(),
                format!("file exceeds max_file_size_bytes ({} bytes)", self.config.max_file_size_bytes),
            ));
        }
        let language = self
            .parser_registry
            .language_for_path(Path::new(&file.path))
            .ok_or_else(|| Diagnostic::parse_failure(file.path.clone(), "no parser registered for this file extension"))?;
        let cst = self
            .parser_registry
            .parse(&file.content, language)
            .ok_or_else(|| Diagnostic::parse_failure(file.path.clone(), "tree-sitter failed to produce a parse tree"))?;

        let generator = structural::generator_for(language);
        let mut doc = generator.generate(&cst, repo_id, snapshot_id, &file.path);
        if cst.is_partial {
            doc.diagnostics.push(Diagnostic::parse_failure(file.path.clone(), format!("{} parse error(s); partial IR emitted", cst.error_count)));
        }
        doc.canonicalize();
        Ok(doc)
    }
}

/// Re-exports for callers that want the common types without reaching
/// into each submodule.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::interproc::{CallGraph, InterprocAnalyzer, TaintEndpoint};
    pub use crate::model::{Edge, EdgeKind, Entity, IRDocument, Node, NodeKind, TaintPath};
    pub use crate::query::{Budget, PathQuery, Q, E};
    pub use crate::taint::{compile_atom_file, AtomMatch, AtomRule, Matcher, TypeNormalizer};
    pub use crate::{BuildResult, Pipeline, SourceFile};
}
