//! Fictures: server-rendered anonymous blogging.
//!
//! Layout follows ports and adapters. [`domain`] holds the model and the
//! use-cases, [`inbound`] the actix screens, and [`outbound`] the hosted and
//! in-memory implementations of the domain ports.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use domain::TraceId;
pub use middleware::Trace;
