//! Interprocedural taint analysis (§4.6 "Interprocedural taint"):
//! function-level summaries plus a call-graph walk connect source and
//! sink matches discovered independently by the taint matcher.

pub mod analyzer;
pub mod callgraph;
pub mod summary;

pub use analyzer::{InterprocAnalyzer, TaintEndpoint};
pub use callgraph::{CallGraph, CallGraphProvider};
pub use summary::FunctionTaintSummary;
