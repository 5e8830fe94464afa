//! Tier inference and specificity scoring (§4.5 step 2), ported in
//! semantics (not verbatim) from `trcr/compiler/tier_inference.py`'s
//! `infer_tier`/`calculate_specificity_score`/`infer_tier_batch`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Tier1,
    Tier2,
    Tier3,
}

/// One match clause of a rule's `match_clauses[]` (§3 "AtomRule"). Exact
/// and pattern forms of `base_type`/`call` are mutually exclusive in a
/// well-formed rule file, but the inference functions below tolerate both
/// being set (the pattern field is simply ignored once an exact one wins).
#[derive(Debug, Clone, Default)]
pub struct MatchClause {
    pub base_type: Option<String>,
    pub base_type_pattern: Option<String>,
    pub call: Option<String>,
    pub call_pattern: Option<String>,
    pub read: Option<String>,
    pub args: Vec<String>,
    pub has_constraints: bool,
}

impl MatchClause {
    fn wildcard_count(&self) -> usize {
        [&self.base_type_pattern, &self.call_pattern]
            .iter()
            .filter_map(|p| p.as_deref())
            .map(|p| p.chars().filter(|c| *c == '*').count())
            .sum()
    }

    fn exact_count(&self) -> usize {
        [&self.base_type, &self.call, &self.read].iter().filter(|f| f.is_some()).count()
    }
}

/// A wildcard pattern is "simple" if its single `*` sits at the start
/// XOR the end (`*.Cursor`, `subprocess.*`) rather than in the middle or
/// on both ends (`*mongo*`), which requires a substring scan instead of a
/// prefix/suffix trie lookup.
fn is_simple_pattern(pattern: &str) -> bool {
    let starts = pattern.starts_with('*');
    let ends = pattern.ends_with('*');
    starts != ends
}

/// Classifies a clause's specificity into one of three tiers. Only
/// `Tier3` clauses may fall back to a full linear scan (§4.5 step 3).
pub fn infer_tier(clause: &MatchClause) -> Tier {
    let wildcards = clause.wildcard_count();
    let exact = clause.exact_count();

    if wildcards == 0 && exact >= 2 {
        return Tier::Tier1;
    }
    if wildcards == 0 && exact == 1 {
        return Tier::Tier2;
    }
    if wildcards == 1 && exact >= 1 {
        return Tier::Tier2;
    }
    if wildcards == 1 && exact == 0 {
        let pattern = clause.base_type_pattern.as_deref().or(clause.call_pattern.as_deref()).unwrap_or("");
        if is_simple_pattern(pattern) {
            return Tier::Tier2;
        }
    }
    Tier::Tier3
}

pub fn infer_tier_batch(clauses: &[MatchClause]) -> Vec<Tier> {
    clauses.iter().map(infer_tier).collect()
}

/// Specificity score used for candidate tie-breaking (§4.5): exact fields
/// score higher than wildcard fields of equal length, and longer literal
/// content scores higher within each category. Matches
/// `calculate_specificity_score`'s point values (10.0/0.1 exact,
/// 5.0/0.1 wildcard, +5.0 for constraints) field-for-field.
pub fn calculate_specificity_score(clause: &MatchClause) -> f64 {
    let mut score = 0.0;
    for exact in [&clause.base_type, &clause.call, &clause.read].into_iter().flatten() {
        score += 10.0 + exact.len() as f64 * 0.1;
    }
    for pattern in [&clause.base_type_pattern, &clause.call_pattern].into_iter().flatten() {
        let literal_chars = pattern.chars().filter(|c| *c != '*').count();
        score += 5.0 + literal_chars as f64 * 0.1;
    }
    if clause.has_constraints {
        score += 5.0;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_exact_fields_no_wildcards_is_tier1() {
        let clause = MatchClause {
            base_type: Some("sqlite3.Cursor".into()),
            call: Some("execute".into()),
            ..Default::default()
        };
        assert_eq!(infer_tier(&clause), Tier::Tier1);
        assert!(calculate_specificity_score(&clause) >= 20.0);
    }

    #[test]
    fn single_exact_field_is_tier2() {
        let clause = MatchClause { call: Some("execute".into()), ..Default::default() };
        assert_eq!(infer_tier(&clause), Tier::Tier2);
    }

    #[test]
    fn simple_prefix_wildcard_alone_is_tier2() {
        let clause = MatchClause { base_type_pattern: Some("*.Cursor".into()), ..Default::default() };
        assert_eq!(infer_tier(&clause), Tier::Tier2);
    }

    #[test]
    fn contains_wildcard_alone_is_tier3() {
        let clause = MatchClause { base_type_pattern: Some("*mongo*".into()), ..Default::default() };
        assert_eq!(infer_tier(&clause), Tier::Tier3);
    }

    #[test]
    fn two_wildcards_is_tier3() {
        let clause = MatchClause {
            base_type_pattern: Some("*.Cursor".into()),
            call_pattern: Some("exec*".into()),
            ..Default::default()
        };
        assert_eq!(infer_tier(&clause), Tier::Tier3);
    }

    /// A broad contains pattern paired with an exact field still counts two
    /// wildcard characters, not one pattern field — §4.5 classifies broad
    /// contains patterns as tier3 even when another field is exact.
    #[test]
    fn broad_contains_pattern_with_exact_field_is_still_tier3() {
        let clause = MatchClause {
            base_type_pattern: Some("*mongo*".into()),
            call: Some("execute".into()),
            ..Default::default()
        };
        assert_eq!(infer_tier(&clause), Tier::Tier3);
    }

    #[test]
    fn batch_inference_preserves_order() {
        let clauses = vec![
            MatchClause { base_type: Some("a".into()), call: Some("b".into()), ..Default::default() },
            MatchClause { base_type_pattern: Some("*mongo*".into()), ..Default::default() },
        ];
        assert_eq!(infer_tier_batch(&clauses), vec![Tier::Tier1, Tier::Tier3]);
    }
}
