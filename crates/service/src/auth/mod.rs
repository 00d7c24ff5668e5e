//! Auth module: layered like the rest of the service crate (domain, repository, service).
//!
//! Registration, login and role seeding live here. Storage, password hashing,
//! token signing and credential checks are injected through the traits in
//! [`repository`], [`password`], [`token`] and [`authenticator`].

pub mod authenticator;
pub mod bootstrap;
pub mod context;
pub mod domain;
pub mod errors;
pub mod password;
pub mod repo;
pub mod repository;
pub mod service;
pub mod token;

pub use context::SecurityContext;
pub use errors::AuthError;
pub use service::{AuthConfig, AuthService};
