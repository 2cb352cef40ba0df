//! Document Store Adapters - DocumentStore implementations
//!
//! These implement the port from dao-domain.

pub mod http;
pub mod in_memory;
