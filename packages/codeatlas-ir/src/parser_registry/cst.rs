//! The CST returned by a parse: a tree-sitter tree plus the partial/error
//! metadata downstream consumers must honor (§4.1).

use crate::model::Language;
use crate::span::Span;
use tree_sitter::{Node as TsNode, Tree};

pub struct Cst {
    pub tree: Tree,
    pub source: String,
    pub language: Language,
    pub is_partial: bool,
    pub error_count: usize,
}

impl Cst {
    pub fn new(tree: Tree, source: String, language: Language) -> Self {
        let error_count = count_errors(&tree.root_node());
        let is_partial = tree.root_node().has_error();
        Self {
            tree,
            source,
            language,
            is_partial,
            error_count,
        }
    }

    pub fn root(&self) -> TsNode<'_> {
        self.tree.root_node()
    }

    pub fn node_text(&self, node: &TsNode) -> &str {
        self.source.get(node.byte_range()).unwrap_or("")
    }
}

fn count_errors(node: &TsNode) -> usize {
    let mut count = if node.is_error() || node.is_missing() { 1 } else { 0 };
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        count += count_errors(&child);
    }
    count
}

/// 1-indexed, UTF-8 column counting (§3).
pub fn ts_to_span(node: &TsNode) -> Span {
    Span::new(
        node.start_position().row as u32 + 1,
        node.start_position().column as u32,
        node.end_position().row as u32 + 1,
        node.end_position().column as u32,
    )
}
