//! Wire formats of the hosted REST and auth APIs.
//!
//! Responses are decoded into these DTOs first and mapped into domain types
//! in one pass, so malformed rows surface as decode errors at the edge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    AccessToken, AuthSession, Credentials, Email, Post, PostDraft, PostId, RefreshToken, UserId,
};

/// A row of the posts table.
#[derive(Debug, Deserialize)]
pub(super) struct PostRowDto {
    id: Value,
    title: String,
    content: String,
    user_id: String,
    created_at: DateTime<Utc>,
}

impl PostRowDto {
    pub(super) fn into_domain(self) -> Result<Post, String> {
        // Tables keyed by serial integers return numeric ids.
        let raw_id = match self.id {
            Value::String(id) => id,
            Value::Number(id) => id.to_string(),
            other => return Err(format!("unsupported post id {other}")),
        };
        let id = PostId::new(raw_id).map_err(|err| err.to_string())?;
        let user_id = UserId::new(self.user_id)
            .map_err(|err| format!("post {id} has an invalid author: {err}"))?;
        Ok(Post::new(id, self.title, self.content, user_id, self.created_at))
    }
}

/// Insert payload.
#[derive(Debug, Serialize)]
pub(super) struct NewPostDto<'a> {
    pub(super) title: &'a str,
    pub(super) content: &'a str,
    pub(super) user_id: &'a str,
}

/// Update payload; the author never changes.
#[derive(Debug, Serialize)]
pub(super) struct PostPatchDto<'a> {
    pub(super) title: &'a str,
    pub(super) content: &'a str,
}

impl<'a> From<&'a PostDraft> for PostPatchDto<'a> {
    fn from(draft: &'a PostDraft) -> Self {
        Self {
            title: draft.title().as_str(),
            content: draft.content().as_str(),
        }
    }
}

/// Email/password body for sign-up, sign-in and anonymous upgrades.
#[derive(Serialize)]
pub(super) struct CredentialsDto<'a> {
    email: &'a str,
    password: &'a str,
}

impl<'a> From<&'a Credentials> for CredentialsDto<'a> {
    fn from(credentials: &'a Credentials) -> Self {
        Self {
            email: credentials.email().as_str(),
            password: credentials.password(),
        }
    }
}

/// User object returned by the auth API.
#[derive(Debug, Deserialize)]
pub(super) struct AuthUserDto {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    new_email: Option<String>,
    #[serde(default)]
    is_anonymous: bool,
}

impl AuthUserDto {
    /// Email the account is confirmed under, if any.
    fn confirmed_email(&self) -> Option<Email> {
        self.email
            .as_deref()
            .filter(|email| !email.is_empty())
            .and_then(|email| Email::new(email).ok())
    }

    /// Address the account is known under, confirmed or not.
    pub(super) fn address(&self) -> Option<Email> {
        self.confirmed_email().or_else(|| {
            self.new_email
                .as_deref()
                .and_then(|email| Email::new(email).ok())
        })
    }

    /// Whether an email change still awaits confirmation.
    pub(super) fn has_pending_email(&self) -> bool {
        self.new_email.as_deref().is_some_and(|email| !email.is_empty())
    }

    pub(super) fn user_id(&self) -> Result<UserId, String> {
        UserId::new(self.id.as_str()).map_err(|err| format!("invalid user id: {err}"))
    }

    /// Session for this user authorised by `token`.
    pub(super) fn into_session(self, token: AccessToken) -> Result<AuthSession, String> {
        let user_id = self.user_id()?;
        match self.confirmed_email() {
            Some(email) if !self.is_anonymous => {
                Ok(AuthSession::authenticated(user_id, token, email))
            }
            _ => Ok(AuthSession::anonymous(user_id, token)),
        }
    }
}

/// Token grant: `access_token` plus the user it belongs to, and the refresh
/// token with the access token's expiry as unix seconds.
#[derive(Debug, Deserialize)]
pub(super) struct SessionDto {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUserDto,
}

impl SessionDto {
    pub(super) fn into_session(self) -> Result<AuthSession, String> {
        let expires_at = self
            .expires_at
            .map(|secs| {
                DateTime::from_timestamp(secs, 0)
                    .ok_or_else(|| format!("expires_at {secs} out of range"))
            })
            .transpose()?;
        let session = self.user.into_session(AccessToken::new(self.access_token))?;
        Ok(match self.refresh_token.filter(|token| !token.is_empty()) {
            Some(token) => session.with_refresh(RefreshToken::new(token), expires_at),
            None => session,
        })
    }
}

/// Body of the refresh grant.
#[derive(Serialize)]
pub(super) struct RefreshGrantDto<'a> {
    pub(super) refresh_token: &'a str,
}

/// Sign-up answers with a session when confirmations are off and with the
/// bare user object when a confirmation email was sent.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum SignUpDto {
    Session(SessionDto),
    PendingUser(AuthUserDto),
}

/// Error body of the auth API. Older deployments use `error` and
/// `error_description`, newer ones `error_code` and `msg`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct AuthErrorDto {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl AuthErrorDto {
    pub(super) fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Machine-readable code, whichever field carries it.
    pub(super) fn code(&self) -> Option<&str> {
        self.error_code.as_deref().or(self.error.as_deref())
    }

    /// Human-readable message, whichever field carries it.
    pub(super) fn message(&self) -> Option<&str> {
        self.msg
            .as_deref()
            .or(self.message.as_deref())
            .or(self.error_description.as_deref())
    }
}
