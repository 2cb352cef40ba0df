//! # Employee DAO Domain Layer
//!
//! Pure persistence vocabulary with zero external dependencies.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Domain Layer (This Crate)                     │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │  model/     - Employee, Document, DocumentKey               ││
//! │  │  repository/- Port traits (DocumentStore, EntityMapper)     ││
//! │  └─────────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The search engine behind [`DocumentStore`] can be swapped without
//! touching this crate; the same goes for the entity behind [`EntityMapper`].

pub mod model;
pub mod repository;

// Re-export commonly used types
pub use model::{
    document::{compose_key, Document, DocumentKey, KEY_PART_SEPARATOR, KEY_SEPARATOR},
    employee::{Employee, EmployeeId, EmployeeMapper},
};

pub use repository::{
    document_store::{DocumentStore, StoreError, WriteMode, WriteResult},
    entity_mapper::{EntityMapper, MappingError},
};
