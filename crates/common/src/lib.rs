//! Shared plumbing for the student registry crates: tracing setup
//! and small transport types.

pub mod types;
pub mod utils;
