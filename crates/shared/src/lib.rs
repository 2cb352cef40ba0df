//! # Employee DAO Shared
//!
//! Configuration and error types used across the workspace.

pub mod config;
pub mod error;

// Re-exports
pub use config::*;
pub use error::*;
