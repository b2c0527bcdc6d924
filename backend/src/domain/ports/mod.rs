//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Each trait exposes strongly typed errors so adapters map their failures
//! into predictable variants; services translate those into domain errors.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_provider;
mod post_repository;

#[cfg(test)]
pub use auth_provider::MockAuthProvider;
pub use auth_provider::{AuthProvider, AuthProviderError};
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use post_repository::{PostRepository, PostStoreError, WriteOutcome};
