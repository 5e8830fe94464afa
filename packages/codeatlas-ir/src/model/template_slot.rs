//! `TemplateSlot` — a context-tagged interpolation point inside a template
//! language (HTML-in-framework). Lets security rules reason about
//! sink/escaping behavior without re-parsing the template (§3).

use crate::span::Span;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextKind {
    HtmlText,
    RawHtml,
    UrlAttr,
    EventHandler,
    Style,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscapeMode {
    /// Framework's default auto-escaping applies.
    Auto,
    /// Escaping explicitly bypassed (e.g. `dangerouslySetInnerHTML`, `|safe`).
    None,
    /// Escaped for a JS-string context (inline event handler attribute
    /// bodies, `<script>` template interpolation).
    JsString,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSlot {
    pub expr: String,
    pub file_path: String,
    pub span: Span,
    pub context_kind: ContextKind,
    pub is_sink: bool,
    pub escape_mode: EscapeMode,
}

impl TemplateSlot {
    pub fn new(expr: impl Into<String>, file_path: impl Into<String>, span: Span, context_kind: ContextKind) -> Self {
        let is_sink = matches!(context_kind, ContextKind::RawHtml | ContextKind::UrlAttr | ContextKind::EventHandler);
        Self {
            expr: expr.into(),
            file_path: file_path.into(),
            span,
            context_kind,
            is_sink,
            escape_mode: EscapeMode::Auto,
        }
    }

    pub fn with_escape_mode(mut self, mode: EscapeMode) -> Self {
        self.escape_mode = mode;
        if matches!(mode, EscapeMode::None) && matches!(self.context_kind, ContextKind::RawHtml) {
            self.is_sink = true;
        }
        self
    }

    /// A raw-HTML slot with escaping disabled is always a security-relevant
    /// sink, independent of the constructor's context-kind default.
    pub fn is_unescaped_raw_html(&self) -> bool {
        matches!(self.context_kind, ContextKind::RawHtml) && matches!(self.escape_mode, EscapeMode::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_html_with_no_escaping_is_a_sink() {
        let slot = TemplateSlot::new("user.bio", "t.html", Span::zero(), ContextKind::RawHtml)
            .with_escape_mode(EscapeMode::None);
        assert!(slot.is_sink);
        assert!(slot.is_unescaped_raw_html());
    }

    #[test]
    fn text_context_is_not_a_sink() {
        let slot = TemplateSlot::new("user.bio", "t.html", Span::zero(), ContextKind::HtmlText);
        assert!(!slot.is_sink);
    }
}
