//! Core data model (§3): the types every other module builds on.

pub mod edge;
pub mod entity;
pub mod id;
pub mod ir_document;
pub mod node;
pub mod occurrence;
pub mod symbol;
pub mod taint_path;
pub mod template_slot;

pub use edge::{Edge, EdgeKind};
pub use entity::{Entity, EntityKind};
pub use ir_document::IRDocument;
pub use node::{Attrs, Language, Node, NodeKind};
pub use occurrence::{Occurrence, OccurrenceRole};
pub use symbol::{ImpactClass, Symbol, SymbolHash, SymbolKind};
pub use taint_path::TaintPath;
pub use template_slot::{ContextKind, EscapeMode, TemplateSlot};
