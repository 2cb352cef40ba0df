//! Document Store - Abstract access to a document-search engine
//!
//! The engine itself (Elasticsearch, an in-memory map, ...) is an external
//! collaborator. This trait names the primitives the repositories need.

use crate::model::document::{Document, DocumentKey};

/// Outcome code reported by the engine for a write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteResult {
    Created,
    Updated,
    Deleted,
    /// The addressed document does not exist
    NotFound,
    /// The engine accepted the request but changed nothing
    Noop,
}

impl WriteResult {
    /// Number of documents changed by the write
    pub fn affected(&self) -> u64 {
        match self {
            WriteResult::Created | WriteResult::Updated | WriteResult::Deleted => 1,
            WriteResult::NotFound | WriteResult::Noop => 0,
        }
    }

    /// Parse the engine's lowercase result name (`"created"`, `"noop"`, ...)
    pub fn from_engine_name(name: &str) -> Option<Self> {
        match name {
            "created" => Some(WriteResult::Created),
            "updated" => Some(WriteResult::Updated),
            "deleted" => Some(WriteResult::Deleted),
            "not_found" => Some(WriteResult::NotFound),
            "noop" => Some(WriteResult::Noop),
            _ => None,
        }
    }
}

impl core::fmt::Display for WriteResult {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            WriteResult::Created => "created",
            WriteResult::Updated => "updated",
            WriteResult::Deleted => "deleted",
            WriteResult::NotFound => "not_found",
            WriteResult::Noop => "noop",
        };
        f.write_str(name)
    }
}

/// How a full-document write treats an existing document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Create or replace
    Upsert,
    /// Fail with [`StoreError::Conflict`] if the key is taken
    CreateOnly,
}

/// Errors reported by a document store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The engine could not be reached or the request did not complete
    Transport { message: String },
    /// A create-only write hit an existing document
    Conflict { key: String },
    /// The addressed index does not exist
    IndexNotFound { index: String },
    /// The engine answered with a status the client does not handle
    UnexpectedResponse { status: u16, message: String },
    /// The engine answered with a body the client cannot parse
    InvalidResponse { message: String },
    /// Local failure inside the store implementation
    PersistenceError { message: String },
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StoreError::Transport { message } => {
                write!(f, "Transport error: {}", message)
            }
            StoreError::Conflict { key } => {
                write!(f, "Document already exists: {}", key)
            }
            StoreError::IndexNotFound { index } => {
                write!(f, "Index not found: {}", index)
            }
            StoreError::UnexpectedResponse { status, message } => {
                write!(f, "Unexpected engine response ({}): {}", status, message)
            }
            StoreError::InvalidResponse { message } => {
                write!(f, "Invalid engine response: {}", message)
            }
            StoreError::PersistenceError { message } => {
                write!(f, "Persistence error: {}", message)
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Document Store Trait
///
/// This is a PORT in hexagonal architecture.
/// Documents are addressed by (index, mapping, key).
///
/// All methods take `&self`: one store handle is shared by every repository,
/// so implementations must be safe for concurrent use.
///
/// Note: No async here. Every call blocks until the engine answers.
pub trait DocumentStore: Send + Sync {
    /// Check whether an index exists
    fn index_exists(&self, index: &str) -> Result<bool, StoreError>;

    /// Create an index
    fn create_index(&self, index: &str) -> Result<(), StoreError>;

    /// Fetch a document, `None` if absent
    fn get(
        &self,
        index: &str,
        mapping: &str,
        key: &DocumentKey,
    ) -> Result<Option<Document>, StoreError>;

    /// Write a full document
    fn put(
        &self,
        index: &str,
        mapping: &str,
        key: &DocumentKey,
        document: &Document,
        mode: WriteMode,
    ) -> Result<WriteResult, StoreError>;

    /// Merge `partial` into an existing document
    ///
    /// Returns [`WriteResult::NotFound`] and changes nothing if the
    /// document does not exist.
    fn update(
        &self,
        index: &str,
        mapping: &str,
        key: &DocumentKey,
        partial: &Document,
    ) -> Result<WriteResult, StoreError>;

    /// Delete a document
    fn delete(&self, index: &str, mapping: &str, key: &DocumentKey)
        -> Result<WriteResult, StoreError>;

    /// All documents of an index carrying `mapping`
    ///
    /// Implementations return every matching document or an error, never
    /// a silently shortened list.
    fn search(&self, index: &str, mapping: &str) -> Result<Vec<Document>, StoreError>;

    /// Number of documents of an index carrying `mapping`
    fn count(&self, index: &str, mapping: &str) -> Result<u64, StoreError>;

    /// Check whether a document exists
    fn exists(&self, index: &str, mapping: &str, key: &DocumentKey) -> Result<bool, StoreError> {
        Ok(self.get(index, mapping, key)?.is_some())
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<S> {
    fn index_exists(&self, index: &str) -> Result<bool, StoreError> {
        (**self).index_exists(index)
    }

    fn create_index(&self, index: &str) -> Result<(), StoreError> {
        (**self).create_index(index)
    }

    fn get(
        &self,
        index: &str,
        mapping: &str,
        key: &DocumentKey,
    ) -> Result<Option<Document>, StoreError> {
        (**self).get(index, mapping, key)
    }

    fn put(
        &self,
        index: &str,
        mapping: &str,
        key: &DocumentKey,
        document: &Document,
        mode: WriteMode,
    ) -> Result<WriteResult, StoreError> {
        (**self).put(index, mapping, key, document, mode)
    }

    fn update(
        &self,
        index: &str,
        mapping: &str,
        key: &DocumentKey,
        partial: &Document,
    ) -> Result<WriteResult, StoreError> {
        (**self).update(index, mapping, key, partial)
    }

    fn delete(
        &self,
        index: &str,
        mapping: &str,
        key: &DocumentKey,
    ) -> Result<WriteResult, StoreError> {
        (**self).delete(index, mapping, key)
    }

    fn search(&self, index: &str, mapping: &str) -> Result<Vec<Document>, StoreError> {
        (**self).search(index, mapping)
    }

    fn count(&self, index: &str, mapping: &str) -> Result<u64, StoreError> {
        (**self).count(index, mapping)
    }

    fn exists(&self, index: &str, mapping: &str, key: &DocumentKey) -> Result<bool, StoreError> {
        (**self).exists(index, mapping, key)
    }
}
