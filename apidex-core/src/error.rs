// apidex-core/src/error.rs
// Error types shared across the crate

use thiserror::Error;

use crate::validate::ValidationErrors;

pub type Result<T> = std::result::Result<T, ApidexError>;

/// Crate-wide error type.
///
/// Query compilation follows a strict policy: a condition that matches no
/// recognized form is reported as `InvalidQuerySyntax` instead of being
/// silently dropped. Unknown attribute names are NOT an error - they fall
/// back to free-text search so arbitrary words remain searchable.
#[derive(Error, Debug)]
pub enum ApidexError {
    #[error("invalid query syntax in '{clause}': {reason}")]
    InvalidQuerySyntax { clause: String, reason: String },

    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("API not found: {0}")]
    ApiNotFound(String),

    #[error("no deployment of '{api_name}' on {platform_id}/{environment_id}")]
    DeploymentNotFound {
        api_name: String,
        platform_id: String,
        environment_id: String,
    },

    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApidexError {
    /// Shorthand for the query-syntax error used throughout the compiler.
    pub fn syntax(clause: &str, reason: impl Into<String>) -> Self {
        ApidexError::InvalidQuerySyntax {
            clause: clause.to_string(),
            reason: reason.into(),
        }
    }
}
