//! Port for the hosted authentication service.

use async_trait::async_trait;

use crate::domain::{AccessToken, AuthSession, Credentials, SignUpOutcome};

use super::define_port_error;

define_port_error! {
    /// Errors raised by authentication adapters.
    pub enum AuthProviderError {
        /// Email or password did not match an account.
        InvalidCredentials => "invalid login credentials",
        /// The email address already belongs to an account.
        AlreadyRegistered => "email address already registered",
        /// The refresh token is missing, revoked or already used.
        SessionExpired => "hosted session can no longer be renewed",
        /// The service refused the request, for example a disabled feature or
        /// an expired token.
        Rejected {
            /// Detail reported by the adapter.
            message: String,
        } => "auth request rejected: {message}",
        /// The service could not be reached or timed out.
        Connection {
            /// Detail reported by the adapter.
            message: String,
        } => "auth service connection failed: {message}",
        /// The service answered with a payload that could not be read.
        Decode {
            /// Detail reported by the adapter.
            message: String,
        } => "auth response malformed: {message}",
    }
}

/// Port for creating and revoking hosted sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an anonymous user and return its session.
    async fn sign_in_anonymously(&self) -> Result<AuthSession, AuthProviderError>;

    /// Register a new email/password account.
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, AuthProviderError>;

    /// Exchange email/password for a session.
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthProviderError>;

    /// Attach email and password to the anonymous user behind `session`,
    /// keeping its user id.
    async fn upgrade_anonymous(
        &self,
        session: &AuthSession,
        credentials: &Credentials,
    ) -> Result<SignUpOutcome, AuthProviderError>;

    /// Trade the refresh token of `session` for a new access token.
    ///
    /// Refresh tokens are single-use: the returned session carries the
    /// replacement, which callers must persist.
    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession, AuthProviderError>;

    /// Revoke the session behind `token`.
    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthProviderError>;
}
