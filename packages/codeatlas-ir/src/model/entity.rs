//! `Entity` — a projection of a `Node` plus its surrounding edges, used for
//! taint rule matching (§3, §4.4).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Call,
    Read,
    Assign,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub kind: EntityKind,
    /// e.g. `"sqlite3.Cursor"` — the inferred receiver type, if any.
    pub base_type: Option<String>,
    pub call_name: Option<String>,
    pub read_name: Option<String>,
    pub args: Vec<String>,
    pub kwargs: BTreeMap<String, String>,
    /// Fully-qualified call target once cross-file resolution has run,
    /// e.g. `"django.db.connection.cursor"`.
    pub qualified_call: Option<String>,
    /// Control-flow conditions proven to hold at this entity's program
    /// point (e.g. `"is_admin == true"`), supplied by the CFG/guard
    /// analysis so rule matching can reference guard state without
    /// re-deriving it.
    pub guards: Vec<String>,
}

impl Entity {
    pub fn new(id: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            kind,
            base_type: None,
            call_name: None,
            read_name: None,
            args: Vec::new(),
            kwargs: BTreeMap::new(),
            qualified_call: None,
            guards: Vec::new(),
        }
    }

    pub fn with_base_type(mut self, base_type: impl Into<String>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }

    pub fn with_call_name(mut self, call_name: impl Into<String>) -> Self {
        self.call_name = Some(call_name.into());
        self
    }

    pub fn with_qualified_call(mut self, qualified_call: impl Into<String>) -> Self {
        self.qualified_call = Some(qualified_call.into());
        self
    }

    pub fn has_guard(&self, guard: &str) -> bool {
        self.guards.iter().any(|g| g == guard)
    }
}
