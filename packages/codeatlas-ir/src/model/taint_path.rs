//! `TaintPath` — a concrete route from a tainted source to a sink,
//! discovered by the interprocedural analyzer (§3, §4.6 "Interprocedural
//! taint").

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaintPath {
    pub source_entity_id: String,
    pub sink_entity_id: String,
    /// Entity/node ids visited along the path, source first, sink last.
    pub nodes: Vec<String>,
    /// Combined confidence of every hop (source match, each summary
    /// propagation, sink match) — product of per-hop confidences, so it
    /// only decreases as a path crosses more function boundaries.
    pub confidence: f64,
    /// Atom ids of any sanitizer matched along the path. A non-empty
    /// list does not imply the path is safe; callers decide whether a
    /// sanitizer downgrades or removes a finding.
    pub sanitizer_ids: Vec<String>,
}

impl TaintPath {
    pub fn new(source_entity_id: impl Into<String>, sink_entity_id: impl Into<String>) -> Self {
        Self {
            source_entity_id: source_entity_id.into(),
            sink_entity_id: sink_entity_id.into(),
            nodes: Vec::new(),
            confidence: 1.0,
            sanitizer_ids: Vec::new(),
        }
    }

    pub fn is_sanitized(&self) -> bool {
        !self.sanitizer_ids.is_empty()
    }
}
