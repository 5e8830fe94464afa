//! The Matcher (§4.5 "Matcher"): runs each rule's candidate plan against
//! an entity set, applies prefilters and constraints, and emits
//! classified `AtomMatch`es with confidence scores.

use super::rule::{AtomKind, AtomRule, CompiledClause};
use crate::model::{Entity, EntityKind};
use globset::{Glob, GlobMatcher};
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Tainted,
    /// Downgraded because the entity carries a guard the rule accepts as
    /// sanitizing (§4.5 "Matcher" step 4). The match still carries
    /// through the query engine rather than being dropped.
    Sanitized,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomMatch {
    pub atom_id: String,
    pub entity_id: String,
    pub kind: AtomKind,
    pub confidence: f64,
    pub status: MatchStatus,
}

struct CachedMatcher {
    matcher: Option<GlobMatcher>,
    inserted_at: Instant,
}

/// Bounded LRU, TTL-evicted cache of compiled glob matchers for wildcard
/// match clauses (§4.5 step 5, "wildcard generators cache ... bounded
/// LRU with TTL"). Exact clauses (`CachePolicy::Bypass`) never reach
/// this cache — compiling a glob per entity check is what the cache
/// exists to avoid on a hot wildcard atom, so a pattern is compiled
/// once and reused until it's evicted or its TTL lapses.
pub struct GlobCache {
    inner: Mutex<LruCache<String, CachedMatcher>>,
    ttl: Duration,
}

impl GlobCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self { inner: Mutex::new(LruCache::new(NonZeroUsize::new(capacity.max(1)).unwrap())), ttl }
    }

    fn is_match(&self, pattern: &str, value: &str) -> bool {
        let mut guard = self.inner.lock();
        if let Some(cached) = guard.get(pattern) {
            if cached.inserted_at.elapsed() <= self.ttl {
                return cached.matcher.as_ref().is_some_and(|m| m.is_match(value));
            }
        }
        let matcher = Glob::new(pattern).ok().map(|g| g.compile_matcher());
        let is_match = matcher.as_ref().is_some_and(|m| m.is_match(value));
        guard.put(pattern.to_string(), CachedMatcher { matcher, inserted_at: Instant::now() });
        is_match
    }
}

impl Default for GlobCache {
    fn default() -> Self {
        Self::new(256, Duration::from_secs(3_600))
    }
}

pub struct Matcher {
    rules: Vec<AtomRule>,
    glob_cache: GlobCache,
}

impl Matcher {
    pub fn new(rules: Vec<AtomRule>) -> Self {
        Self { rules, glob_cache: GlobCache::default() }
    }

    /// Like [`Self::new`], but shares a caller-supplied [`GlobCache`] —
    /// useful when matching many documents' entity sets back to back so
    /// compiled wildcard patterns survive across calls.
    pub fn with_glob_cache(rules: Vec<AtomRule>, glob_cache: GlobCache) -> Self {
        Self { rules, glob_cache }
    }

    /// Matches every compiled rule against every entity. Real candidate
    /// indexes (hash/trie/trigram) narrow this to `R_active` per entity
    /// in the full pipeline; this function is the reference semantics
    /// those indexes must agree with — same entity set, same matches,
    /// regardless of which generator found the candidate.
    pub fn match_entities(&self, entities: &[Entity]) -> Vec<AtomMatch> {
        let mut matches = Vec::new();
        for rule in &self.rules {
            for entity in entities {
                if let Some(m) = self.match_rule(rule, entity) {
                    matches.push(m);
                }
            }
        }
        matches
    }

    fn match_rule(&self, rule: &AtomRule, entity: &Entity) -> Option<AtomMatch> {
        let matched_clause = rule.match_clauses.iter().find(|c| self.clause_matches_entity(&c.clause, entity))?;

        let confidence = confidence_for(matched_clause, entity);
        let status = if rule.accepted_guards.iter().any(|g| entity.has_guard(g)) {
            MatchStatus::Sanitized
        } else {
            MatchStatus::Tainted
        };

        Some(AtomMatch { atom_id: rule.atom_id.clone(), entity_id: entity.id.clone(), kind: rule.kind, confidence, status })
    }

    fn clause_matches_entity(&self, clause: &super::tier::MatchClause, entity: &Entity) -> bool {
        if let Some(base_type) = &clause.base_type {
            if entity.base_type.as_deref() != Some(base_type.as_str()) {
                return false;
            }
        }
        if let Some(pattern) = &clause.base_type_pattern {
            match (self.glob_match(pattern, entity.base_type.as_deref()), entity.base_type.is_some()) {
                (true, true) => {}
                _ => return false,
            }
        }
        if let Some(call) = &clause.call {
            let matches_call = entity.call_name.as_deref() == Some(call.as_str())
                || entity.qualified_call.as_deref().is_some_and(|q| q.ends_with(&format!(".{call}")) || q == call);
            if !matches_call {
                return false;
            }
        }
        if let Some(pattern) = &clause.call_pattern {
            if !self.glob_match(pattern, entity.call_name.as_deref()) {
                return false;
            }
        }
        if let Some(read) = &clause.read {
            if entity.read_name.as_deref() != Some(read.as_str()) {
                return false;
            }
        }
        if matches!(entity.kind, EntityKind::Call) && clause.read.is_some() && clause.call.is_none() && clause.call_pattern.is_none() {
            return false;
        }
        true
    }

    fn glob_match(&self, pattern: &str, value: Option<&str>) -> bool {
        let Some(value) = value else { return false };
        self.glob_cache.is_match(pattern, value)
    }
}

/// Confidence reflects analysis precision (§4.5 "Matcher" step 3): a
/// resolved qualified call plus a known receiver type means CFG/DFG
/// evidence backed the match; a bare AST-level name match is weaker;
/// tier3 fallback matches (broad, unverified patterns) are weakest.
fn confidence_for(clause: &CompiledClause, entity: &Entity) -> f64 {
    if entity.qualified_call.is_some() && entity.base_type.is_some() {
        0.95
    } else if clause.tier == super::tier::Tier::Tier3 {
        0.5
    } else {
        0.7
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taint::normalizer::TypeNormalizer;
    use crate::taint::rule::RuleCompiler;
    use crate::taint::yaml::{RawAtom, RawMatchClause};

    fn sink_rule() -> AtomRule {
        let raw = RawAtom {
            atom_id: "sqlite.execute.sink".into(),
            kind: AtomKind::Sink,
            tags: vec![],
            severity: None,
            cwe: None,
            accepted_guards: vec!["parameterized".into()],
            match_clauses: vec![RawMatchClause { base_type: Some("sqlite3.Cursor".into()), call: Some("execute".into()), ..Default::default() }],
        };
        RuleCompiler::new(TypeNormalizer::default()).compile(&raw).unwrap()
    }

    #[test]
    fn matching_entity_produces_tainted_atom_match() {
        let matcher = Matcher::new(vec![sink_rule()]);
        let entity = Entity::new("e1", EntityKind::Call).with_base_type("sqlite3.Cursor").with_call_name("execute").with_qualified_call("cur.execute");
        let matches = matcher.match_entities(&[entity]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].status, MatchStatus::Tainted);
        assert!(matches[0].confidence >= 0.9);
    }

    #[test]
    fn guarded_entity_is_downgraded_to_sanitized() {
        let matcher = Matcher::new(vec![sink_rule()]);
        let mut entity = Entity::new("e1", EntityKind::Call).with_base_type("sqlite3.Cursor").with_call_name("execute");
        entity.guards.push("parameterized".into());
        let matches = matcher.match_entities(&[entity]);
        assert_eq!(matches[0].status, MatchStatus::Sanitized);
    }

    #[test]
    fn unrelated_entity_produces_no_match() {
        let matcher = Matcher::new(vec![sink_rule()]);
        let entity = Entity::new("e1", EntityKind::Call).with_base_type("requests.Session").with_call_name("get");
        assert!(matcher.match_entities(&[entity]).is_empty());
    }

    fn wildcard_type_rule() -> AtomRule {
        let raw = RawAtom {
            atom_id: "any-cursor.execute.sink".into(),
            kind: AtomKind::Sink,
            tags: vec![],
            severity: None,
            cwe: None,
            accepted_guards: vec![],
            match_clauses: vec![RawMatchClause { base_type_pattern: Some("*.Cursor".into()), call: Some("execute".into()), ..Default::default() }],
        };
        RuleCompiler::new(TypeNormalizer::default()).compile(&raw).unwrap()
    }

    #[test]
    fn wildcard_base_type_matches_through_the_glob_cache() {
        let matcher = Matcher::new(vec![wildcard_type_rule()]);
        let a = Entity::new("e1", EntityKind::Call).with_base_type("sqlite3.Cursor").with_call_name("execute");
        let b = Entity::new("e2", EntityKind::Call).with_base_type("mysql.Cursor").with_call_name("execute");
        let matches = matcher.match_entities(&[a, b]);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn glob_cache_reuses_a_compiled_matcher_across_calls() {
        let cache = GlobCache::new(8, Duration::from_secs(3_600));
        assert!(cache.is_match("*.Cursor", "sqlite3.Cursor"));
        assert!(!cache.is_match("*.Cursor", "requests.Session"));
        assert!(cache.is_match("*.Cursor", "mysql.Cursor"));
    }

    #[test]
    fn glob_cache_treats_an_expired_entry_as_freshly_compiled() {
        let cache = GlobCache::new(8, Duration::from_millis(0));
        assert!(cache.is_match("*.Cursor", "sqlite3.Cursor"));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.is_match("*.Cursor", "sqlite3.Cursor"));
    }
}
