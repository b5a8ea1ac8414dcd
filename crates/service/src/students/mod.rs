//! Student registry: validation, storage/logging brokers and the classifying service.
//!
//! Layers:
//! - [`validation`] pure structural checks
//! - [`broker`] storage abstraction with in-memory and SeaORM ([`repo::seaorm`]) implementations
//! - [`logging`] write-only logging abstraction
//! - [`service`] operations wrapped by the failure classifier

pub mod errors;
pub mod validation;
pub mod broker;
pub mod logging;
pub mod repo;
pub mod service;


pub use errors::{StorageError, StudentError, StudentValidationError};
pub use service::{StudentService, StudentServiceImpl};
