//! Domain-level errors (no external dependencies)

use std::collections::TryReserveError;

use thiserror::Error;

use crate::domain::node::NodeKind;

/// Tree errors represent violations of the forest invariants.
///
/// Every failing operation is reported before its first write, so an error
/// always means "operation aborted, tree unchanged".
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("root is null")]
    NullRoot,

    #[error("no such target key: {0}")]
    NoSuchTarget(String),

    #[error("key already exists in tree: {0}")]
    DuplicateKey(String),

    #[error("node '{key}' is a {kind} node")]
    WrongNodeKind { key: String, kind: NodeKind },

    #[error("node '{key}' contains {found} value, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: NodeKind,
        found: NodeKind,
    },

    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    #[error("allocating memory failed: {0}")]
    AllocationFailure(#[from] TryReserveError),
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
