//! Post use-cases: read, create, and author-gated edit and delete.

use std::sync::Arc;

use tracing::{info, warn};

use super::identity::IdentityResolver;
use super::ports::{PostRepository, PostStoreError, WriteOutcome};
use super::{AuthSession, Error, Identity, Post, PostDraft, PostId};

/// Result of creating a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPost {
    /// The stored row.
    pub post: Post,
    /// Anonymous session minted for a guest author, to be persisted.
    pub issued: Option<AuthSession>,
}

/// Whether the caller may edit a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAccess {
    /// The caller wrote the post.
    Owner(Post),
    /// Someone else wrote it.
    NotOwner(Post),
}

/// Post service over a [`PostRepository`].
#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
    identity: IdentityResolver,
}

impl PostService {
    /// Create the service.
    pub fn new(repo: Arc<dyn PostRepository>, identity: IdentityResolver) -> Self {
        Self { repo, identity }
    }

    /// Load a post.
    ///
    /// # Errors
    /// Returns [`super::ErrorCode::NotFound`] for unknown ids.
    pub async fn get(&self, id: &PostId) -> Result<Post, Error> {
        self.repo
            .find(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("post {id} not found")))
    }

    /// Store a new post, signing a guest in anonymously first.
    ///
    /// # Errors
    /// Propagates identity and store failures.
    pub async fn create(&self, identity: &Identity, draft: &PostDraft) -> Result<CreatedPost, Error> {
        let (actor, issued) = self.identity.ensure_author(identity).await?.into_parts();
        let post = self
            .repo
            .insert(&actor, draft)
            .await
            .map_err(map_store_error)?;
        info!(post_id = %post.id(), user_id = %actor.user_id(), "post created");
        Ok(CreatedPost { post, issued })
    }

    /// Load a post together with the caller's edit rights.
    ///
    /// # Errors
    /// Returns [`super::ErrorCode::NotFound`] for unknown ids.
    pub async fn edit_access(&self, identity: &Identity, id: &PostId) -> Result<EditAccess, Error> {
        let post = self.get(id).await?;
        Ok(if identity.owns(&post) {
            EditAccess::Owner(post)
        } else {
            EditAccess::NotOwner(post)
        })
    }

    /// Apply `draft` to a post the caller wrote.
    ///
    /// # Errors
    /// Returns [`super::ErrorCode::Unauthorized`] without a session and
    /// [`super::ErrorCode::Forbidden`] when no row matches the id and author.
    pub async fn update(&self, identity: &Identity, id: &PostId, draft: &PostDraft) -> Result<(), Error> {
        let session = require_session(identity)?;
        let outcome = self
            .repo
            .update(&session.actor(), id, draft)
            .await
            .map_err(map_store_error)?;
        require_applied(outcome, id, "update")
    }

    /// Delete a post the caller wrote.
    ///
    /// # Errors
    /// Returns [`super::ErrorCode::Unauthorized`] without a session and
    /// [`super::ErrorCode::Forbidden`] when no row matches the id and author.
    pub async fn delete(&self, identity: &Identity, id: &PostId) -> Result<(), Error> {
        let session = require_session(identity)?;
        let outcome = self
            .repo
            .delete(&session.actor(), id)
            .await
            .map_err(map_store_error)?;
        require_applied(outcome, id, "delete")
    }
}

fn require_session(identity: &Identity) -> Result<&AuthSession, Error> {
    identity
        .session()
        .ok_or_else(|| Error::unauthorized("Sign in to change posts"))
}

fn require_applied(outcome: WriteOutcome, id: &PostId, action: &str) -> Result<(), Error> {
    match outcome {
        WriteOutcome::Applied => {
            info!(post_id = %id, action, "post changed");
            Ok(())
        }
        WriteOutcome::NoMatch => {
            warn!(post_id = %id, action, "author filter matched no rows");
            Err(Error::forbidden(format!("You can only {action} your own posts")))
        }
    }
}

pub(crate) fn map_store_error(error: PostStoreError) -> Error {
    match error {
        PostStoreError::Connection { message } => {
            warn!(error = %message, "post store unreachable");
            Error::service_unavailable("Post store unavailable")
        }
        PostStoreError::Unauthorized { message } => {
            warn!(error = %message, "post store rejected credentials");
            Error::unauthorized("Your session has expired, please sign in again")
        }
        PostStoreError::Rejected { message } => Error::invalid_request(message),
        PostStoreError::Decode { message } => {
            Error::internal(format!("post store response malformed: {message}"))
        }
    }
}
