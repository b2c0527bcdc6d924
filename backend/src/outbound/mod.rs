//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **hosted**: reqwest-backed adapters for the hosted REST and auth APIs.
//! - **memory**: process-local adapters for development and tests.
//!
//! Adapters are thin translators between domain types and wire formats.
//! They contain no business logic.

pub mod hosted;
pub mod memory;
