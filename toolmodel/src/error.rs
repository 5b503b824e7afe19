//! Validation errors for tool and backend values.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Tool name is required")]
    EmptyName,

    #[error("Tool name is {len} characters, maximum is {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("Tool name contains invalid characters: {0}")]
    InvalidName(String),

    #[error("Namespace contains invalid characters: {0}")]
    InvalidNamespace(String),

    #[error("Invalid {field}: {reason}")]
    InvalidSchema { field: &'static str, reason: String },

    #[error("Unknown backend kind: {0}")]
    UnknownBackendKind(String),
}
