//! `FunctionTaintSummary` — a per-function compression of taint behavior
//! (§4.6 "Interprocedural taint"), so the analyzer never re-walks a
//! callee's body once its summary is known.

use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTaintSummary {
    pub function_id: String,
    /// Indices of parameters that, if tainted at a call site, make the
    /// return value (or a documented side effect) tainted.
    pub tainted_params: BTreeSet<usize>,
    pub return_tainted: bool,
    /// True if any parameter reaching this function is sanitized before
    /// use — downgrades a path that flows through this function.
    pub sanitizes: bool,
    pub confidence: f64,
}

impl FunctionTaintSummary {
    pub fn new(function_id: impl Into<String>) -> Self {
        Self { function_id: function_id.into(), tainted_params: BTreeSet::new(), return_tainted: false, sanitizes: false, confidence: 1.0 }
    }

    pub fn taint_param(&mut self, idx: usize) {
        self.tainted_params.insert(idx);
    }

    pub fn is_param_tainted(&self, idx: usize) -> bool {
        self.tainted_params.contains(&idx)
    }

    /// Given which argument indices are tainted at a call site, decides
    /// whether this call propagates taint to the return value.
    pub fn propagates(&self, tainted_arg_indices: &BTreeSet<usize>) -> bool {
        self.return_tainted || self.tainted_params.intersection(tainted_arg_indices).next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn propagates_when_tainted_arg_matches_tainted_param() {
        let mut summary = FunctionTaintSummary::new("sanitize_or_pass");
        summary.taint_param(0);
        assert!(summary.propagates(&BTreeSet::from([0])));
        assert!(!summary.propagates(&BTreeSet::from([1])));
    }

    #[test]
    fn always_returns_tainted_return_overrides_param_check() {
        let mut summary = FunctionTaintSummary::new("get_user_input");
        summary.return_tainted = true;
        assert!(summary.propagates(&BTreeSet::new()));
    }
}
