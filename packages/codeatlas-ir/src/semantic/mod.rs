//! Semantic IR Builder (§4.4): adds control-flow blocks, data-flow edges,
//! expression entities, and bidirectional type inference on top of the
//! structural IR. SSA/dominator analysis is optional: compiled in only
//! under the `ssa` Cargo feature, and within that build further gated at
//! runtime by `Config::enable_ssa` (§4.4 "SSA/dominator analysis is
//! optional and gated by a config flag") — off by default either way.

pub mod cfg;
pub mod dfg;
pub mod types;

#[cfg(feature = "ssa")]
pub mod ssa;

pub use cfg::{BlockKind, CfgBuilder, CfgEdgeKind};
pub use types::{infer_types, ConstraintSource, Type, TypeConstraint, TypeEnvironment};

use crate::model::IRDocument;

/// Runs the semantic passes over an already structurally-generated (and
/// cross-file resolved) document (§4.4). Control-flow blocks/edges are
/// built earlier, by the structural generator itself, per function body —
/// that's where the CST each function's branches/loops/try-catch blocks
/// come from is still in scope. This entry point covers the passes that
/// need the whole document's declarations in view rather than one
/// function's CST: data-flow edges, bidirectional type inference (which
/// both reads and rewrites the `Expression` nodes' `base_type` attrs the
/// structural layer seeded with its best-effort receiver guess), and,
/// when `enable_ssa` is set on an `ssa`-featured build, dominator
/// annotation over the CFG blocks already in the document.
pub fn build_semantic_layer(doc: &mut IRDocument, enable_ssa: bool) {
    dfg::build_data_flow_edges(doc);
    types::infer_types(doc);

    #[cfg(feature = "ssa")]
    if enable_ssa {
        ssa::annotate_dominators(doc);
    }
    #[cfg(not(feature = "ssa"))]
    let _ = enable_ssa;
}
