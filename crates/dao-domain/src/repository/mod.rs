//! Port Traits - The "Ports" of Hexagonal Architecture
//!
//! These traits define WHAT persistence needs, not how it's done.
//!
//! ```text
//! Domain Layer             │  Adapter Layer
//! ─────────────────────────┼────────────────────────
//! trait DocumentStore      │  HttpDocumentStore
//!   fn get() / put()       │  InMemoryDocumentStore
//! trait EntityMapper       │  (implemented next to each entity)
//! ```

pub mod document_store;
pub mod entity_mapper;
