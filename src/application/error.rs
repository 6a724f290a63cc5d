//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::TreeError;

/// Application errors wrap tree errors and add ingestion and config context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("line {line}: malformed entry '{content}': {reason}")]
    MalformedLine {
        line: usize,
        content: String,
        reason: String,
    },

    #[error("line {line}: {source}")]
    Ingest {
        line: usize,
        #[source]
        source: TreeError,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
