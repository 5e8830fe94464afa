//! Non-fatal diagnostics attached to documents and operations (§7).

use crate::span::Span;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    ParseFailure,
    ResolverConflict,
    TypeConflict,
    LspUnavailable,
    SkippedFileTooLarge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    pub file_path: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        severity: Severity,
        file_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            file_path: file_path.into(),
            span: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn parse_failure(file_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::ParseFailure, Severity::Warning, file_path, message)
    }

    pub fn resolver_conflict(
        file_path: impl Into<String>,
        fqn: &str,
        other_file: &str,
    ) -> Self {
        Self::new(
            DiagnosticKind::ResolverConflict,
            Severity::Warning,
            file_path,
            format!("duplicate definition of `{fqn}`, also defined in {other_file}"),
        )
    }
}
