//! Repository error types

use dao_domain::{MappingError, StoreError};
use thiserror::Error;

/// Repository operation, carried by engine errors and log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SelectAll,
    Select,
    Insert,
    Update,
    Delete,
    Exists,
    CountAll,
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Operation::SelectAll => "select_all",
            Operation::Select => "select",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Exists => "exists",
            Operation::CountAll => "count_all",
        };
        f.write_str(name)
    }
}

/// Errors returned by repositories and entity services
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The index could not be checked or created at construction time
    #[error("Failed to provision index '{index}': {source}")]
    IndexProvisioning {
        index: String,
        #[source]
        source: StoreError,
    },

    /// Insert attempted on a key that already holds a document
    #[error("Duplicate key: '{key}' already exists")]
    DuplicateKey { key: String },

    /// A stored document could not be turned back into an entity
    #[error("Cannot map document at '{location}': {source}")]
    Mapping {
        location: String,
        #[source]
        source: MappingError,
    },

    /// Any other engine or transport failure
    #[error("{operation} failed: {source}")]
    Engine {
        operation: Operation,
        #[source]
        source: StoreError,
    },
}

impl RepositoryError {
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, RepositoryError::DuplicateKey { .. })
    }

    pub(crate) fn engine(operation: Operation) -> impl FnOnce(StoreError) -> Self {
        move |source| RepositoryError::Engine { operation, source }
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
