//! # Employee DAO Use Case Layer
//!
//! Application rules on top of the domain ports.
//!
//! - [`GenericRepository`] - CRUD primitives for any entity with an
//!   [`EntityMapper`](dao_domain::EntityMapper), against any
//!   [`DocumentStore`](dao_domain::DocumentStore)
//! - [`EmployeeService`] - typed facade with boolean/entity results

pub mod employee_service;
pub mod error;
pub mod repository;

pub use dao_domain;

pub use employee_service::EmployeeService;
pub use error::{Operation, RepositoryError, Result};
pub use repository::GenericRepository;
