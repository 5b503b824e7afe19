//! Tool index error types.

use thiserror::Error;
use toolmodel::ToolError;

pub type IndexResult<T> = Result<T, IndexError>;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid tool: {0}")]
    InvalidTool(#[from] ToolError),

    #[error("Tool '{0}' protocol fields differ from existing registration")]
    ToolMismatch(String),

    #[error("Invalid backend: {0}")]
    InvalidBackend(String),

    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("Limit must be positive")]
    InvalidLimit,

    #[error("Searcher does not guarantee deterministic ordering; cursor pagination refused")]
    NonDeterministicSearcher,

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of an [`IndexError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidTool,
    InvalidBackend,
    InvalidCursor,
    InvalidArgument,
    Search,
    Config,
}

impl IndexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IndexError::NotFound(_) => ErrorKind::NotFound,
            IndexError::InvalidTool(_) | IndexError::ToolMismatch(_) => ErrorKind::InvalidTool,
            IndexError::InvalidBackend(_) => ErrorKind::InvalidBackend,
            IndexError::InvalidCursor(_) => ErrorKind::InvalidCursor,
            IndexError::InvalidLimit | IndexError::NonDeterministicSearcher => {
                ErrorKind::InvalidArgument
            }
            IndexError::Search(_) => ErrorKind::Search,
            IndexError::Config(_) => ErrorKind::Config,
        }
    }
}
