//! Call graph protocol for the interprocedural analyzer. Kept as a trait
//! over a concrete `BTreeMap` so snapshot rebuilds (§4.7) can swap the
//! backing structure without touching the analyzer.

use std::collections::{BTreeMap, BTreeSet};

pub trait CallGraphProvider {
    fn callees(&self, function_id: &str) -> Vec<String>;
    fn functions(&self) -> Vec<String>;

    fn callers(&self, _function_id: &str) -> Vec<String> {
        Vec::new()
    }

    fn contains_function(&self, function_id: &str) -> bool {
        self.functions().iter().any(|f| f == function_id)
    }
}

/// `BTreeMap`-backed call graph: deterministic iteration order, no
/// reliance on hash-seed-dependent traversal (§5 determinism invariant).
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    calls: BTreeMap<String, BTreeSet<String>>,
    callers: BTreeMap<String, BTreeSet<String>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_call(&mut self, caller: impl Into<String>, callee: impl Into<String>) {
        let caller = caller.into();
        let callee = callee.into();
        self.callers.entry(callee.clone()).or_default().insert(caller.clone());
        self.calls.entry(caller).or_default().insert(callee);
    }

    pub fn add_function(&mut self, function_id: impl Into<String>) {
        self.calls.entry(function_id.into()).or_default();
    }
}

impl CallGraphProvider for CallGraph {
    fn callees(&self, function_id: &str) -> Vec<String> {
        self.calls.get(function_id).into_iter().flatten().cloned().collect()
    }

    fn functions(&self) -> Vec<String> {
        let mut all: BTreeSet<String> = self.calls.keys().cloned().collect();
        all.extend(self.calls.values().flatten().cloned());
        all.into_iter().collect()
    }

    fn callers(&self, function_id: &str) -> Vec<String> {
        self.callers.get(function_id).into_iter().flatten().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_graph_tracks_callees_and_callers() {
        let mut cg = CallGraph::new();
        cg.add_call("main", "handle_request");
        cg.add_call("handle_request", "run_query");

        assert_eq!(cg.callees("main"), vec!["handle_request"]);
        assert_eq!(cg.callers("run_query"), vec!["handle_request"]);
        assert!(cg.callees("run_query").is_empty());
        assert_eq!(cg.functions().len(), 3);
    }
}
