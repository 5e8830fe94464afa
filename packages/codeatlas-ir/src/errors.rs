//! Error types for codeatlas-ir.
//!
//! Only fatal conditions (rule compile errors, config errors, invariant
//! violations) flow through this type. Non-fatal conditions — parse
//! failures, resolver conflicts, budget exhaustion — are represented as
//! data (`Diagnostic`s, `budget_exhausted` flags) attached to the affected
//! document or result, never raised (see §7 of the design).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IrError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rule compile error in {file}:{line}: {message}")]
    RuleCompile {
        file: String,
        line: usize,
        message: String,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl IrError {
    pub fn rule_compile(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        IrError::RuleCompile {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        IrError::Config(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        IrError::Invariant(message.into())
    }
}

pub type Result<T> = std::result::Result<T, IrError>;
