//! Service layer providing the student registry's business operations.
//! - Validates students before they reach storage.
//! - Classifies storage failures into validation / dependency / service errors.
//! - Talks to storage and logging only through injected broker traits.

pub mod students;
#[cfg(test)]
pub mod test_support;
