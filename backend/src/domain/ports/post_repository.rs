//! Port for post persistence.
//!
//! Writes carry the acting user so adapters can both authorise the request
//! and restrict updates and deletes to rows that user wrote.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Actor, Post, PostDraft, PostId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by post repository adapters.
    pub enum PostStoreError {
        /// The store could not be reached or timed out.
        Connection {
            /// Detail reported by the adapter.
            message: String,
        } => "post store connection failed: {message}",
        /// The store refused the caller's credentials.
        Unauthorized {
            /// Detail reported by the adapter.
            message: String,
        } => "post store rejected credentials: {message}",
        /// The store rejected the request itself.
        Rejected {
            /// Detail reported by the adapter.
            message: String,
        } => "post store rejected request: {message}",
        /// The store answered with a payload that could not be read.
        Decode {
            /// Detail reported by the adapter.
            message: String,
        } => "post store response malformed: {message}",
    }
}

/// Effect of an author-filtered update or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A row matched the id and author filter and was changed.
    Applied,
    /// No row matched; nothing changed.
    NoMatch,
}

/// Port for reading and writing posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Posts newest first, restricted to the requested window.
    async fn list(&self, window: PageRequest) -> Result<Vec<Post>, PostStoreError>;

    /// A single post by id.
    async fn find(&self, id: &PostId) -> Result<Option<Post>, PostStoreError>;

    /// Store a new post authored by `actor` and return the stored row.
    async fn insert(&self, actor: &Actor, draft: &PostDraft) -> Result<Post, PostStoreError>;

    /// Replace title and content of the post `id` if `actor` wrote it.
    async fn update(
        &self,
        actor: &Actor,
        id: &PostId,
        draft: &PostDraft,
    ) -> Result<WriteOutcome, PostStoreError>;

    /// Delete the post `id` if `actor` wrote it.
    async fn delete(&self, actor: &Actor, id: &PostId) -> Result<WriteOutcome, PostStoreError>;
}
