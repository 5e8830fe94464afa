//! Compiled `AtomRule` (§3) and the compiler that turns a raw YAML atom
//! definition into one, running normalization, tier inference, and
//! candidate-plan construction (§4.5 steps 1-5).

use super::candidate::{assign_cache_policy, build_plan, CachePolicy, CandidatePlan, PlanError};
use super::normalizer::TypeNormalizer;
use super::tier::{calculate_specificity_score, infer_tier, MatchClause, Tier};
use crate::taint::yaml::{RawAtom, RawMatchClause};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtomKind {
    Source,
    Sink,
    Sanitizer,
    Propagator,
}

/// A compiled match clause: the raw fields plus everything the compiler
/// derived from them.
#[derive(Debug, Clone)]
pub struct CompiledClause {
    pub clause: MatchClause,
    pub tier: Tier,
    pub specificity: f64,
    pub candidate_plan: CandidatePlan,
    pub cache_policy: CachePolicy,
}

#[derive(Debug, Clone)]
pub struct AtomRule {
    pub atom_id: String,
    pub kind: AtomKind,
    pub tags: Vec<String>,
    pub severity: Option<String>,
    pub cwe: Option<String>,
    pub match_clauses: Vec<CompiledClause>,
    /// The rule's overall tier is its most permissive (least specific)
    /// clause's tier — a rule is only as selective as its weakest clause.
    pub tier: Tier,
    /// A rule accepts a sanitizing guard predicate by name; matches whose
    /// entity carries one of these in `guards[]` are downgraded rather
    /// than dropped (§4.5 step "Matcher" 4).
    pub accepted_guards: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("atom `{0}` has no match clauses")]
    NoClauses(String),
    #[error("atom `{0}` clause {1}: {2}")]
    Plan(String, usize, PlanError),
}

pub struct RuleCompiler {
    normalizer: TypeNormalizer,
}

impl RuleCompiler {
    pub fn new(normalizer: TypeNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn compile(&self, raw: &RawAtom) -> Result<AtomRule, CompileError> {
        if raw.match_clauses.is_empty() {
            return Err(CompileError::NoClauses(raw.atom_id.clone()));
        }

        let mut compiled = Vec::with_capacity(raw.match_clauses.len());
        for (i, rc) in raw.match_clauses.iter().enumerate() {
            let clause = self.normalize_clause(rc);
            let tier = infer_tier(&clause);
            let specificity = calculate_specificity_score(&clause);
            let candidate_plan =
                build_plan(&clause, tier).map_err(|e| CompileError::Plan(raw.atom_id.clone(), i, e))?;
            let cache_policy = assign_cache_policy(&candidate_plan, &clause);
            compiled.push(CompiledClause { clause, tier, specificity, candidate_plan, cache_policy });
        }

        let rule_tier = compiled.iter().map(|c| c.tier).max().unwrap_or(Tier::Tier3);

        Ok(AtomRule {
            atom_id: raw.atom_id.clone(),
            kind: raw.kind,
            tags: raw.tags.clone(),
            severity: raw.severity.clone(),
            cwe: raw.cwe.clone(),
            match_clauses: compiled,
            tier: rule_tier,
            accepted_guards: raw.accepted_guards.clone(),
        })
    }

    fn normalize_clause(&self, rc: &RawMatchClause) -> MatchClause {
        MatchClause {
            base_type: rc.base_type.as_deref().map(|t| self.normalizer.normalize(t)),
            base_type_pattern: rc.base_type_pattern.clone(),
            call: rc.call.clone(),
            call_pattern: rc.call_pattern.clone(),
            read: rc.read.clone(),
            args: rc.args.clone(),
            has_constraints: rc.constraints.as_ref().is_some_and(|c| !c.is_empty()),
        }
    }
}
