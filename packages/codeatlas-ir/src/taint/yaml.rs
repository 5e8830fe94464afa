//! YAML atom-file loading (§4.5 "Compiler. Loads YAML atom files (per
//! language)"). This module only parses the raw rule text into the
//! pre-compiled shape `rule::RuleCompiler` consumes; normalization, tier
//! inference, and candidate-plan construction happen downstream.

use super::rule::AtomKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConstraint {
    pub field: String,
    pub op: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMatchClause {
    #[serde(default)]
    pub base_type: Option<String>,
    #[serde(default)]
    pub base_type_pattern: Option<String>,
    #[serde(default)]
    pub call: Option<String>,
    #[serde(default)]
    pub call_pattern: Option<String>,
    #[serde(default)]
    pub read: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub constraints: Option<Vec<RawConstraint>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawAtom {
    pub atom_id: String,
    pub kind: AtomKind,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub cwe: Option<String>,
    #[serde(default)]
    pub accepted_guards: Vec<String>,
    pub match_clauses: Vec<RawMatchClause>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AtomFile {
    #[serde(default)]
    pub atoms: Vec<RawAtom>,
}

#[derive(Debug, thiserror::Error)]
pub enum YamlLoadError {
    #[error("failed to parse atom file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub fn load_atom_file(text: &str) -> Result<AtomFile, YamlLoadError> {
    let file: AtomFile = serde_yaml::from_str(text)?;
    Ok(file)
}
