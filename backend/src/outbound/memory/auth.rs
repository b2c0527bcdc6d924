//! In-memory auth provider for local development and tests.
//!
//! Mirrors the hosted service closely enough for the screens: anonymous
//! users, email/password accounts, in-place upgrades, single-use refresh
//! tokens, and optional email confirmation that blocks sign-in until
//! [`InMemoryAuthProvider::confirm`] is called. Access tokens carry no
//! expiry here; they only go stale when a store rejects them.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{AuthProvider, AuthProviderError};
use crate::domain::{
    AccessToken, AuthSession, Credentials, Email, RefreshToken, SignUpOutcome, UserId,
};

#[derive(Debug)]
struct Account {
    user_id: UserId,
    password: Zeroizing<String>,
    confirmed: bool,
}

/// Accounts held in process memory, keyed by email.
#[derive(Debug, Default)]
pub struct InMemoryAuthProvider {
    accounts: RwLock<HashMap<String, Account>>,
    refresh_tokens: RwLock<HashMap<String, UserId>>,
    require_confirmation: bool,
}

impl InMemoryAuthProvider {
    /// Provider whose sign-ups wait for email confirmation.
    pub fn requiring_confirmation() -> Self {
        Self {
            require_confirmation: true,
            ..Self::default()
        }
    }

    /// Mark the account for `email` as confirmed. Returns whether it exists.
    pub async fn confirm(&self, email: &Email) -> bool {
        let mut accounts = self.accounts.write().await;
        accounts
            .get_mut(email.as_str())
            .map(|account| account.confirmed = true)
            .is_some()
    }

    /// Attach a fresh refresh token to `session` and remember whose it is.
    async fn issue(&self, session: AuthSession) -> AuthSession {
        let token = format!("local-refresh-{}", Uuid::new_v4());
        self.refresh_tokens
            .write()
            .await
            .insert(token.clone(), session.user_id().clone());
        session.with_refresh(RefreshToken::new(token), None)
    }

    async fn register(
        &self,
        user_id: UserId,
        credentials: &Credentials,
    ) -> Result<SignUpOutcome, AuthProviderError> {
        let mut accounts = self.accounts.write().await;
        let key = credentials.email().as_str().to_owned();
        if accounts.contains_key(&key) {
            return Err(AuthProviderError::already_registered());
        }
        accounts.insert(
            key,
            Account {
                user_id: user_id.clone(),
                password: Zeroizing::new(credentials.password().to_owned()),
                confirmed: !self.require_confirmation,
            },
        );
        if self.require_confirmation {
            return Ok(SignUpOutcome::VerificationPending {
                email: credentials.email().clone(),
            });
        }
        drop(accounts);
        let session = AuthSession::authenticated(user_id, issue_token(), credentials.email().clone());
        Ok(SignUpOutcome::SessionIssued(self.issue(session).await))
    }
}

fn issue_token() -> AccessToken {
    AccessToken::new(format!("local-{}", Uuid::new_v4()))
}

fn fresh_user_id() -> Result<UserId, AuthProviderError> {
    UserId::new(Uuid::new_v4().to_string()).map_err(|err| AuthProviderError::decode(err.to_string()))
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn sign_in_anonymously(&self) -> Result<AuthSession, AuthProviderError> {
        let session = AuthSession::anonymous(fresh_user_id()?, issue_token());
        Ok(self.issue(session).await)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, AuthProviderError> {
        self.register(fresh_user_id()?, credentials).await
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthProviderError> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(credentials.email().as_str())
            .filter(|account| account.password.as_str() == credentials.password())
            .ok_or_else(AuthProviderError::invalid_credentials)?;
        if !account.confirmed {
            return Err(AuthProviderError::rejected("Email not confirmed"));
        }
        let session = AuthSession::authenticated(
            account.user_id.clone(),
            issue_token(),
            credentials.email().clone(),
        );
        drop(accounts);
        Ok(self.issue(session).await)
    }

    async fn upgrade_anonymous(
        &self,
        session: &AuthSession,
        credentials: &Credentials,
    ) -> Result<SignUpOutcome, AuthProviderError> {
        self.register(session.user_id().clone(), credentials).await
    }

    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession, AuthProviderError> {
        let token = session
            .refresh_token()
            .ok_or_else(AuthProviderError::session_expired)?;
        let owner = self.refresh_tokens.write().await.remove(token.expose());
        if owner.as_ref() != Some(session.user_id()) {
            return Err(AuthProviderError::session_expired());
        }
        let grant = self
            .issue(AuthSession::anonymous(session.user_id().clone(), issue_token()))
            .await;
        Ok(session.renewed(grant))
    }

    async fn sign_out(&self, _token: &AccessToken) -> Result<(), AuthProviderError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn credentials() -> Credentials {
        Credentials::for_sign_up("ada@example.com", "Str0ng!pw").expect("credentials")
    }

    #[rstest]
    #[tokio::test]
    async fn sign_up_then_sign_in(credentials: Credentials) {
        let auth = InMemoryAuthProvider::default();
        let SignUpOutcome::SessionIssued(created) =
            auth.sign_up(&credentials).await.expect("sign-up")
        else {
            panic!("expected a session");
        };

        let session = auth.sign_in(&credentials).await.expect("sign-in");
        assert_eq!(session.user_id(), created.user_id());
        assert!(!session.is_anonymous());
    }

    #[rstest]
    #[tokio::test]
    async fn wrong_password_is_rejected(credentials: Credentials) {
        let auth = InMemoryAuthProvider::default();
        auth.sign_up(&credentials).await.expect("sign-up");
        let wrong = Credentials::for_sign_in("ada@example.com", "nope").expect("shape");
        assert_eq!(
            auth.sign_in(&wrong).await,
            Err(AuthProviderError::InvalidCredentials)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_is_rejected(credentials: Credentials) {
        let auth = InMemoryAuthProvider::default();
        auth.sign_up(&credentials).await.expect("sign-up");
        assert_eq!(
            auth.sign_up(&credentials).await,
            Err(AuthProviderError::AlreadyRegistered)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn upgrade_keeps_the_anonymous_user_id(credentials: Credentials) {
        let auth = InMemoryAuthProvider::default();
        let anon = auth.sign_in_anonymously().await.expect("anonymous");

        auth.upgrade_anonymous(&anon, &credentials)
            .await
            .expect("upgrade");
        let session = auth.sign_in(&credentials).await.expect("sign-in");

        assert_eq!(session.user_id(), anon.user_id());
    }

    #[rstest]
    #[tokio::test]
    async fn refresh_rotates_tokens_and_keeps_the_user() {
        let auth = InMemoryAuthProvider::default();
        let anon = auth.sign_in_anonymously().await.expect("anonymous");

        let renewed = auth.refresh(&anon).await.expect("refresh");

        assert_eq!(renewed.user_id(), anon.user_id());
        assert!(renewed.is_anonymous());
        assert_ne!(renewed.access_token(), anon.access_token());
        assert_ne!(renewed.refresh_token(), anon.refresh_token());
    }

    #[rstest]
    #[tokio::test]
    async fn refresh_tokens_are_single_use() {
        let auth = InMemoryAuthProvider::default();
        let anon = auth.sign_in_anonymously().await.expect("anonymous");
        auth.refresh(&anon).await.expect("first refresh");

        assert_eq!(
            auth.refresh(&anon).await,
            Err(AuthProviderError::SessionExpired)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn sessions_without_refresh_tokens_cannot_be_renewed() {
        let auth = InMemoryAuthProvider::default();
        let bare = AuthSession::anonymous(
            UserId::new("abc123").expect("user id"),
            AccessToken::new("t"),
        );
        assert_eq!(
            auth.refresh(&bare).await,
            Err(AuthProviderError::SessionExpired)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn unconfirmed_accounts_cannot_sign_in(credentials: Credentials) {
        let auth = InMemoryAuthProvider::requiring_confirmation();
        let outcome = auth.sign_up(&credentials).await.expect("sign-up");
        assert!(matches!(outcome, SignUpOutcome::VerificationPending { .. }));
        assert!(matches!(
            auth.sign_in(&credentials).await,
            Err(AuthProviderError::Rejected { .. })
        ));

        assert!(auth.confirm(credentials.email()).await);
        assert!(auth.sign_in(&credentials).await.is_ok());
    }
}
