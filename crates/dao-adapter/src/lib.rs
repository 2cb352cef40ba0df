//! # Employee DAO Adapter Layer
//!
//! Implementations of the domain's [`DocumentStore`](dao_domain::DocumentStore) port.
//!
//! ## Structure
//!
//! - `store/http` - Client for an Elasticsearch-compatible engine
//! - `store/in_memory` - Process-local engine for tests and development

pub mod error;
pub mod store;

pub use error::ConnectError;
pub use store::http::{EngineInfo, HttpDocumentStore};
pub use store::in_memory::InMemoryDocumentStore;
