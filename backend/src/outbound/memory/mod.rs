//! Process-local adapters used when no hosted backend is configured.

mod auth;
mod posts;

pub use auth::InMemoryAuthProvider;
pub use posts::InMemoryPostRepository;
