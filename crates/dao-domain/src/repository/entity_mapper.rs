//! Entity Mapper - Entity-specific half of a repository
//!
//! A generic repository knows how to talk to the store; a mapper knows how
//! one entity type is named, keyed and (de)serialized.

use crate::model::document::{Document, DocumentKey};

/// Errors raised when a stored document cannot be turned back into an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// A required field is absent
    MissingField { field: &'static str },
    /// A field is present but cannot be parsed
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl core::fmt::Display for MappingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MappingError::MissingField { field } => {
                write!(f, "Missing field '{}'", field)
            }
            MappingError::InvalidField {
                field,
                value,
                reason,
            } => {
                write!(f, "Invalid value '{}' for field '{}': {}", value, field, reason)
            }
        }
    }
}

impl std::error::Error for MappingError {}

/// Entity Mapper Trait
///
/// Implementations must be pure: the same bean always yields the same key
/// and document, and `from_document(to_document(b)) == b`.
pub trait EntityMapper {
    /// The bean type this mapper handles
    type Entity;

    /// Logical entity name, the prefix of every document key
    fn entity_name(&self) -> &str;

    /// Mapping tag (document type) used for every document of this entity
    fn mapping(&self) -> &str;

    /// Entity-specific part of the key, derived from the primary key fields
    fn key_of(&self, bean: &Self::Entity) -> String;

    /// Serialize a bean into a document
    fn to_document(&self, bean: &Self::Entity) -> Document;

    /// Rebuild a bean from a stored document
    fn from_document(&self, document: &Document) -> Result<Self::Entity, MappingError>;

    /// Full document key: `<entity name>:<key_of(bean)>`
    fn document_key(&self, bean: &Self::Entity) -> DocumentKey {
        DocumentKey::new(self.entity_name(), &self.key_of(bean))
    }
}
