//! Resolves who is acting before any write and manages hosted sessions.
//!
//! Every author id is a hosted-auth user id. A guest who writes a post is
//! signed in anonymously first; signing up from that anonymous session
//! upgrades the same user so earlier posts stay editable. Hosted access
//! tokens are short-lived; sessions are renewed with their refresh token
//! rather than dropped.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use tracing::{info, warn};

use super::ports::{AuthProvider, AuthProviderError};
use super::{Actor, AuthSession, Credentials, Error, Identity, SignUpOutcome};

/// Acting user for a write, plus any session minted while resolving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAuthor {
    actor: Actor,
    issued: Option<AuthSession>,
}

impl ResolvedAuthor {
    /// User performing the write.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Session created by an anonymous sign-in; callers persist it.
    #[must_use]
    pub const fn issued(&self) -> Option<&AuthSession> {
        self.issued.as_ref()
    }

    /// Split into actor and issued session.
    #[must_use]
    pub fn into_parts(self) -> (Actor, Option<AuthSession>) {
        (self.actor, self.issued)
    }
}

/// Identity service on top of an [`AuthProvider`].
#[derive(Clone)]
pub struct IdentityResolver {
    auth: Arc<dyn AuthProvider>,
}

impl IdentityResolver {
    /// Create a resolver backed by `auth`.
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self { auth }
    }

    /// Reuse the caller's session or sign them in anonymously.
    ///
    /// # Errors
    /// Propagates hosted auth failures.
    pub async fn ensure_author(&self, identity: &Identity) -> Result<ResolvedAuthor, Error> {
        if let Some(session) = identity.session() {
            return Ok(ResolvedAuthor {
                actor: session.actor(),
                issued: None,
            });
        }
        let session = self
            .auth
            .sign_in_anonymously()
            .await
            .map_err(map_auth_error)?;
        info!(user_id = %session.user_id(), "anonymous session issued");
        Ok(ResolvedAuthor {
            actor: session.actor(),
            issued: Some(session),
        })
    }

    /// Register an account. An anonymous caller is upgraded in place.
    ///
    /// # Errors
    /// Returns [`super::ErrorCode::Conflict`] for taken addresses and
    /// propagates other hosted auth failures.
    pub async fn sign_up(
        &self,
        identity: &Identity,
        credentials: &Credentials,
    ) -> Result<SignUpOutcome, Error> {
        let outcome = match identity {
            Identity::Anonymous(session) => {
                self.auth.upgrade_anonymous(session, credentials).await
            }
            Identity::Guest | Identity::Authenticated(_) => self.auth.sign_up(credentials).await,
        }
        .map_err(map_auth_error)?;
        info!(
            upgraded = matches!(identity, Identity::Anonymous(_)),
            pending = matches!(outcome, SignUpOutcome::VerificationPending { .. }),
            "sign-up completed"
        );
        Ok(outcome)
    }

    /// Exchange credentials for a session.
    ///
    /// # Errors
    /// Returns [`super::ErrorCode::Unauthorized`] for wrong credentials and
    /// propagates other hosted auth failures.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, Error> {
        self.auth.sign_in(credentials).await.map_err(map_auth_error)
    }

    /// Renew the caller's session if its access token is about to expire.
    ///
    /// Returns the renewed session for the caller to persist, or `None` when
    /// the current token is still good or cannot expire.
    ///
    /// # Errors
    /// Returns [`super::ErrorCode::Unauthorized`] when the hosted session is
    /// gone and propagates other hosted auth failures.
    pub async fn renew_expiring(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<Option<AuthSession>, Error> {
        match identity.session() {
            Some(session) if session.is_expiring(now) => self.renew(session).await.map(Some),
            _ => Ok(None),
        }
    }

    /// Trade the session's refresh token for a new access token.
    ///
    /// # Errors
    /// Returns [`super::ErrorCode::Unauthorized`] when the session cannot be
    /// renewed and propagates other hosted auth failures.
    pub async fn renew(&self, session: &AuthSession) -> Result<AuthSession, Error> {
        match self.auth.refresh(session).await {
            Ok(renewed) => {
                info!(user_id = %session.user_id(), "hosted session renewed");
                Ok(renewed)
            }
            Err(err) => {
                warn!(error = %err, user_id = %session.user_id(), "hosted session renewal failed");
                Err(map_auth_error(err))
            }
        }
    }

    /// Revoke the caller's hosted session. Failures are logged and ignored
    /// because the local session is cleared regardless.
    pub async fn sign_out(&self, identity: &Identity) {
        let Some(session) = identity.session() else {
            return;
        };
        if let Err(err) = self.auth.sign_out(session.access_token()).await {
            warn!(error = %err, user_id = %session.user_id(), "hosted sign-out failed");
        }
    }
}

fn map_auth_error(error: AuthProviderError) -> Error {
    match error {
        AuthProviderError::InvalidCredentials => Error::unauthorized("Invalid email or password"),
        AuthProviderError::AlreadyRegistered => {
            Error::conflict("An account with this email already exists")
        }
        AuthProviderError::SessionExpired => {
            Error::unauthorized("Your session has expired, please sign in again")
        }
        AuthProviderError::Rejected { message } => Error::invalid_request(message),
        AuthProviderError::Connection { message } => {
            warn!(error = %message, "auth service unreachable");
            Error::service_unavailable("Authentication service unavailable")
        }
        AuthProviderError::Decode { message } => {
            Error::internal(format!("auth response malformed: {message}"))
        }
    }
}
