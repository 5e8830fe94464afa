//! Control-flow blocks and `CFG` edges, built per function/method body
//! (§4.4). Arena-owned via `NodeId`/`EdgeId` handles so cycles (loops)
//! never require owning back-references (§9 "Graph cycles").

use crate::model::{Edge, EdgeKind, Node, NodeKind};
use crate::span::Span;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CfgEdgeKind {
    Normal,
    TrueBranch,
    FalseBranch,
    Exception,
}

impl CfgEdgeKind {
    pub fn as_attr(&self) -> &'static str {
        match self {
            CfgEdgeKind::Normal => "normal",
            CfgEdgeKind::TrueBranch => "true_branch",
            CfgEdgeKind::FalseBranch => "false_branch",
            CfgEdgeKind::Exception => "exception",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Entry,
    Exit,
    Branch,
    Loop,
    TryCatch,
    Normal,
}

/// A builder that accumulates block nodes and CFG edges for one function
/// body; `finish` hands ownership of both to the caller to be merged into
/// the enclosing `IRDocument`.
pub struct CfgBuilder<'a> {
    function_id: &'a str,
    function_fqn: &'a str,
    file_path: &'a str,
    language: crate::model::Language,
    blocks: Vec<Node>,
    edges: Vec<Edge>,
    block_counter: usize,
}

impl<'a> CfgBuilder<'a> {
    pub fn new(function_id: &'a str, function_fqn: &'a str, file_path: &'a str, language: crate::model::Language) -> Self {
        Self {
            function_id,
            function_fqn,
            file_path,
            language,
            blocks: Vec::new(),
            edges: Vec::new(),
            block_counter: 0,
        }
    }

    pub fn add_block(&mut self, kind: BlockKind, span: Span) -> String {
        self.block_counter += 1;
        let fqn = format!("{}.<block{}>", self.function_fqn, self.block_counter);
        let id = crate::model::id::content_id(&[
            "Block",
            &fqn,
            &format!("{:?}", span.sort_key()),
            self.file_path,
        ]);
        let mut node = Node::new(id.clone(), NodeKind::Block, fqn, format!("block{}", self.block_counter), self.file_path.to_string(), span, self.language)
            .with_parent(self.function_id.to_string());
        node.attrs.insert("block_kind".into(), serde_json::json!(format!("{kind:?}")));
        self.blocks.push(node);
        id
    }

    pub fn connect(&mut self, from: &str, to: &str, kind: CfgEdgeKind) {
        let id = crate::model::id::content_id(&[EdgeKind::Cfg.as_str(), from, to, kind.as_attr()]);
        let edge = Edge::new(id, EdgeKind::Cfg, from.to_string(), to.to_string())
            .with_attr("cfg_kind", serde_json::json!(kind.as_attr()));
        self.edges.push(edge);
    }

    pub fn finish(self) -> (Vec<Node>, Vec<Edge>) {
        (self.blocks, self.edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Language;

    #[test]
    fn entry_exit_blocks_connect_with_normal_edge() {
        let mut builder = CfgBuilder::new("f1", "pkg.f", "a.py", Language::Python);
        let entry = builder.add_block(BlockKind::Entry, Span::new(1, 0, 1, 0));
        let exit = builder.add_block(BlockKind::Exit, Span::new(5, 0, 5, 0));
        builder.connect(&entry, &exit, CfgEdgeKind::Normal);
        let (blocks, edges) = builder.finish();
        assert_eq!(blocks.len(), 2);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].kind, EdgeKind::Cfg);
    }
}
