//! Error types for the autosort engine.

use crate::CollectionName;
use thiserror::Error;

/// All possible errors from the autosort engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Caller errors
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // Lookup errors
    #[error("collection not found: {0}")]
    CollectionNotFound(CollectionName),

    #[error("record not found: {0}")]
    RecordNotFound(String),

    // Persistence errors raised by a record store adapter
    #[error("store failure: {0}")]
    Store(String),
}

impl Error {
    /// Wrap any adapter error as a store failure.
    pub fn store(err: impl std::fmt::Display) -> Self {
        Error::Store(err.to_string())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
