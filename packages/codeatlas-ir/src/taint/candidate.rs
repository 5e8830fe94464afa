//! Candidate-generation plan construction (§4.5 step 3). The generator
//! set is a closed enum, not a plugin registry (§9 "Design Notes") — new
//! index strategies are added here, not discovered at runtime.

use super::tier::{MatchClause, Tier};
use serde::{Deserialize, Serialize};

/// Trigram matching can require every trigram of the pattern to hit
/// (`All`) or tolerate a minority miss (`KOfN`) when the pattern itself
/// came from a fuzzy/normalized source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrigramPolicy {
    All,
    KOfN(u8),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CandidateGenerator {
    /// O(1) hash lookup on `(base_type, call)` — only valid when both are
    /// exact.
    ExactTypeCall,
    /// O(1) hash lookup on `call` alone.
    ExactCall,
    /// Trie lookup keyed by the call name's prefix (`call_pattern` ending
    /// in `*`, e.g. `exec*`).
    CallPrefix,
    /// Trie lookup keyed by the base-type's suffix (`base_type_pattern`
    /// starting with `*`, e.g. `*.Cursor`).
    TypeSuffix,
    /// Substring match over a trigram index; `*mongo*`-style patterns.
    Trigram(TrigramPolicy),
    /// Token-index fallback for single-word, unanchored patterns.
    Token,
    /// Full linear scan over every entity. Tier3-only, and may never be
    /// combined with another generator (its cost subsumes all of them).
    Fallback,
}

impl CandidateGenerator {
    pub fn cost_order(&self) -> u8 {
        match self {
            CandidateGenerator::ExactTypeCall | CandidateGenerator::ExactCall => 0,
            CandidateGenerator::CallPrefix | CandidateGenerator::TypeSuffix => 1,
            CandidateGenerator::Trigram(_) => 2,
            CandidateGenerator::Token => 3,
            CandidateGenerator::Fallback => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePlan {
    pub generators: Vec<CandidateGenerator>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("Fallback generator cannot be combined with other generators")]
    FallbackNotExclusive,
    #[error("tier3 is required to use the Fallback generator")]
    FallbackRequiresTier3,
    #[error("plan has no generators for a clause that requires at least one")]
    Empty,
}

impl CandidatePlan {
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.generators.is_empty() {
            return Err(PlanError::Empty);
        }
        let has_fallback = self.generators.iter().any(|g| matches!(g, CandidateGenerator::Fallback));
        if has_fallback && self.generators.len() > 1 {
            return Err(PlanError::FallbackNotExclusive);
        }
        Ok(())
    }
}

/// Builds the ordered generator list that together covers `clause`,
/// cheapest-first, given its inferred tier.
pub fn build_plan(clause: &MatchClause, tier: Tier) -> Result<CandidatePlan, PlanError> {
    let mut generators = Vec::new();

    match (clause.base_type.as_deref(), clause.call.as_deref()) {
        (Some(_), Some(_)) => generators.push(CandidateGenerator::ExactTypeCall),
        (None, Some(_)) => generators.push(CandidateGenerator::ExactCall),
        _ => {}
    }

    if let Some(pattern) = &clause.call_pattern {
        if pattern.ends_with('*') && !pattern.starts_with('*') {
            generators.push(CandidateGenerator::CallPrefix);
        } else if pattern.starts_with('*') && pattern.ends_with('*') {
            generators.push(CandidateGenerator::Trigram(TrigramPolicy::All));
        } else {
            generators.push(CandidateGenerator::Token);
        }
    }
    if let Some(pattern) = &clause.base_type_pattern {
        if pattern.starts_with('*') && !pattern.ends_with('*') {
            generators.push(CandidateGenerator::TypeSuffix);
        } else if pattern.starts_with('*') && pattern.ends_with('*') {
            generators.push(CandidateGenerator::Trigram(TrigramPolicy::All));
        } else {
            generators.push(CandidateGenerator::Token);
        }
    }

    if generators.is_empty() {
        if tier != Tier::Tier3 {
            return Err(PlanError::FallbackRequiresTier3);
        }
        generators.push(CandidateGenerator::Fallback);
    }

    generators.sort_by_key(|g| g.cost_order());
    generators.dedup();
    let plan = CandidatePlan { generators };
    plan.validate()?;
    Ok(plan)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CachePolicy {
    /// Exact generators are O(1) already; caching their result adds
    /// overhead without benefit.
    Bypass,
    CacheByTypeAndCall,
    CacheByCallOnly,
    CacheByTypeOnly,
}

/// Assigns a cache policy per §4.5 step 5: exact generators bypass the
/// cache, wildcard generators cache keyed by whichever of type/call is
/// still concrete.
pub fn assign_cache_policy(plan: &CandidatePlan, clause: &MatchClause) -> CachePolicy {
    let all_exact = plan
        .generators
        .iter()
        .all(|g| matches!(g, CandidateGenerator::ExactTypeCall | CandidateGenerator::ExactCall));
    if all_exact {
        return CachePolicy::Bypass;
    }
    match (clause.base_type.is_some() || clause.base_type_pattern.is_some(), clause.call.is_some() || clause.call_pattern.is_some()) {
        (true, true) => CachePolicy::CacheByTypeAndCall,
        (true, false) => CachePolicy::CacheByTypeOnly,
        (false, true) => CachePolicy::CacheByCallOnly,
        (false, false) => CachePolicy::CacheByCallOnly,
    }
}
