//! Global L1 IR Cache (§5 "Shared resources", §4.7 "Rebuild cache").
//!
//! Keyed by `(repo_id, snapshot_id, file_path)`, holding the serialized
//! `IRDocument` bytes produced by the last successful build of that file
//! so an incremental rebuild can reuse everything outside the affected
//! set. Three eviction pressures apply, same as §5 describes for the
//! Global L1 IR Cache: a per-entry TTL, a global entry cap, and a
//! per-project soft quota with fair eviction (no project may hold more
//! than `mean * factor` bytes) using global LRU as the tiebreaker.

use codeatlas_ir::config::IncrementalConfig;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub repo_id: String,
    pub payload: Vec<u8>,
}

impl CacheEntry {
    pub fn new(repo_id: impl Into<String>, key: impl Into<String>, payload: Vec<u8>) -> Self {
        Self { key: key.into(), repo_id: repo_id.into(), payload }
    }
}

/// A stored entry plus the bookkeeping needed for TTL and LRU eviction.
/// `last_access` is a logical tick rather than a wall-clock timestamp —
/// ordering is all eviction needs, and a monotonic counter makes the
/// ordering exact even when many accesses land within the same
/// `Instant` resolution window.
struct Slot {
    entry: CacheEntry,
    inserted_at: Instant,
    last_access: AtomicU64,
}

/// In-memory rebuild cache shared across builds of the same process.
/// Entries are content-addressed by cache key, not by job — there is no
/// job concept here, only "the IR for this file as of this snapshot".
pub struct RebuildCache {
    entries: Arc<DashMap<String, Slot>>,
    clock: AtomicU64,
    ttl: Duration,
    max_entries: usize,
}

impl RebuildCache {
    pub fn new() -> Self {
        Self::from_config(&IncrementalConfig::default())
    }

    /// Builds a cache honoring the process's `incremental.*` settings
    /// (§6: `cache_ttl_s`, `max_entries`).
    pub fn from_config(config: &IncrementalConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock: AtomicU64::new(0),
            ttl: Duration::from_secs(config.cache_ttl_s),
            max_entries: config.max_entries,
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    pub fn put(&self, entry: CacheEntry) {
        let tick = self.tick();
        self.entries.insert(entry.key.clone(), Slot { entry, inserted_at: Instant::now(), last_access: AtomicU64::new(tick) });
        self.enforce_max_entries();
    }

    /// Returns `None` for a missing key and also for an expired one —
    /// callers cannot distinguish "never cached" from "cached but
    /// stale"; both mean "go rebuild this file" (§4.7).
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let expired = match self.entries.get(key) {
            Some(slot) if slot.inserted_at.elapsed() > self.ttl => true,
            Some(slot) => {
                slot.last_access.store(self.tick(), Ordering::Relaxed);
                return Some(slot.entry.payload.clone());
            }
            None => return None,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear_repo(&self, repo_id: &str) {
        self.entries.retain(|_, slot| slot.entry.repo_id != repo_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry whose TTL has elapsed. Eviction elsewhere only
    /// removes entries it must; this is the proactive sweep a caller
    /// can run between builds.
    pub fn evict_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, slot| slot.inserted_at.elapsed() <= ttl);
    }

    /// Enforces the global entry cap by evicting the least-recently-used
    /// entries first, regardless of project.
    fn enforce_max_entries(&self) {
        if self.entries.len() <= self.max_entries {
            return;
        }
        let mut by_access: Vec<(String, u64)> =
            self.entries.iter().map(|e| (e.key().clone(), e.value().last_access.load(Ordering::Relaxed))).collect();
        by_access.sort_by_key(|(_, access)| *access);

        let overflow = self.entries.len() - self.max_entries;
        for (key, _) in by_access.into_iter().take(overflow) {
            self.entries.remove(&key);
        }
    }

    fn bytes_per_project(&self) -> HashMap<String, u64> {
        let mut totals = HashMap::new();
        for slot in self.entries.iter() {
            *totals.entry(slot.entry.repo_id.clone()).or_insert(0u64) += slot.entry.payload.len() as u64;
        }
        totals
    }

    /// Evicts the largest projects down to a fair share whenever any
    /// single project holds more than `mean * factor` bytes (§5's "no
    /// project may exceed mean × 10"). Within the offending project,
    /// eviction is least-recently-used first.
    pub fn enforce_fair_quota(&self, factor: u64) {
        let totals = self.bytes_per_project();
        if totals.is_empty() {
            return;
        }
        let mean = totals.values().sum::<u64>() / totals.len() as u64;
        let ceiling = mean.saturating_mul(factor).max(1);

        for (repo_id, total) in totals {
            if total <= ceiling {
                continue;
            }
            let mut over = total - ceiling;
            let mut candidates: Vec<(String, u64, u64)> = self
                .entries
                .iter()
                .filter(|e| e.entry.repo_id == repo_id)
                .map(|e| (e.key().clone(), e.value().last_access.load(Ordering::Relaxed), e.entry.payload.len() as u64))
                .collect();
            candidates.sort_by_key(|(_, access, _)| *access);

            for (key, _, size) in candidates {
                if over == 0 {
                    break;
                }
                if self.entries.remove(&key).is_some() {
                    over = over.saturating_sub(size);
                }
            }
        }
    }
}

impl Default for RebuildCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the cache key for one file's IR within a snapshot.
pub fn ir_cache_key(repo_id: &str, snapshot_id: &str, file_path: &str) -> String {
    format!("ir:{repo_id}:{snapshot_id}:{file_path}")
}
