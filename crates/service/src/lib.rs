//! Service layer: authentication workflows and pagination on top of `models`.
//! - Separates business logic from data access.
//! - Collaborators (storage, hashing, signing) sit behind traits.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod auth;
pub mod pagination;
pub mod user_service;
#[cfg(test)]
pub mod test_support;
