use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("storage error: {0}")]
    Storage(#[from] codeatlas_storage::StorageError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("invalid mode transition: {from} -> {to}")]
    InvalidModeTransition { from: String, to: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl OrchestratorError {
    pub fn serialization<E: std::fmt::Display>(e: E) -> Self {
        Self::Serialization(e.to_string())
    }

    pub fn config<E: std::fmt::Display>(e: E) -> Self {
        Self::Config(e.to_string())
    }
}

/// Categorizes a failure for retry/alerting decisions upstream. Separate
/// from `OrchestratorError` itself so the same error can be classified
/// differently depending on which caller is asking (§7 "Error taxonomy").
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorCategory {
    /// Retry automatically (e.g. a transient file-read failure).
    Transient,
    /// Don't retry (e.g. malformed config, unsupported file).
    Permanent,
    /// Alert an operator (e.g. cache corruption, disk full).
    Infrastructure,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transient => "transient",
            ErrorCategory::Permanent => "permanent",
            ErrorCategory::Infrastructure => "infrastructure",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_category_display_matches_as_str() {
        for category in [ErrorCategory::Transient, ErrorCategory::Permanent, ErrorCategory::Infrastructure] {
            assert_eq!(category.to_string(), category.as_str());
        }
    }
}
