//! Domain Models
//!
//! `document` is the engine-facing shape of stored data,
//! `employee` is the only entity persisted through it.

pub mod document;
pub mod employee;
