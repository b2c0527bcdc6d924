//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{AuthProvider, PostRepository};
use crate::domain::{FeedService, IdentityResolver, MarkdownRenderer, PostService};

/// Parameter object bundling the port implementations the screens need.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Remote (or in-memory) posts table.
    pub posts: Arc<dyn PostRepository>,
    /// Hosted (or in-memory) auth service.
    pub auth: Arc<dyn AuthProvider>,
    /// Source of "now" for relative timestamps.
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Post use-cases.
    pub posts: PostService,
    /// Feed windows for the home screen and its fragments.
    pub feed: FeedService,
    /// Sign-in, sign-up, sign-out and token renewal.
    pub identity: IdentityResolver,
    /// Markdown to sanitised HTML.
    pub renderer: MarkdownRenderer,
    /// "Now" for relative timestamps and token expiry.
    pub clock: Arc<dyn Clock>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        let HttpStatePorts { posts, auth, clock } = ports;
        let identity = IdentityResolver::new(auth);
        Self {
            posts: PostService::new(Arc::clone(&posts), identity.clone()),
            feed: FeedService::new(posts),
            identity,
            renderer: MarkdownRenderer::new(),
            clock,
        }
    }
}
