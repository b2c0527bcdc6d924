//! Authentication primitives: credentials, hosted sessions and the caller's
//! identity.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, TimeDelta, Utc};

use rand::seq::SliceRandom;
use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{Post, UserId};

/// Minimum password length accepted at sign-up.
pub const PASSWORD_MIN_CHARS: usize = 8;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Email was blank or not shaped like `local@domain.tld`.
    #[error("enter a valid email address")]
    InvalidEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Password does not satisfy the sign-up policy.
    #[error(
        "password must be at least {min} characters and include a lowercase letter, \
         an uppercase letter, a digit and a symbol"
    )]
    WeakPassword {
        /// Minimum length.
        min: usize,
    },
}

/// Trimmed email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate an email address.
    ///
    /// # Errors
    /// Returns [`CredentialsValidationError::InvalidEmail`] when the value is
    /// not shaped like `local@domain.tld`.
    pub fn new(raw: &str) -> Result<Self, CredentialsValidationError> {
        let email = raw.trim();
        if !EMAIL.is_match(email) {
            return Err(CredentialsValidationError::InvalidEmail);
        }
        Ok(Self(email.to_owned()))
    }

    /// Borrow the address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = CredentialsValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

/// Whether `password` satisfies the sign-up policy.
#[must_use]
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= PASSWORD_MIN_CHARS
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password
            .chars()
            .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
}

/// Generate an eight character password that satisfies the sign-up policy.
///
/// One character is drawn from each class, the rest from their union, and
/// the result is shuffled.
///
/// # Examples
/// ```
/// use fictures::domain::{generate_password, is_strong_password};
///
/// let password = generate_password();
/// assert_eq!(password.len(), 8);
/// assert!(is_strong_password(&password));
/// ```
#[must_use]
pub fn generate_password() -> Zeroizing<String> {
    let mut rng = rand::thread_rng();
    let classes = [LOWERCASE, UPPERCASE, DIGITS, SYMBOLS];
    let mut chars: Vec<u8> = classes
        .iter()
        .filter_map(|class| class.choose(&mut rng).copied())
        .collect();
    let all: Vec<u8> = classes.concat();
    while chars.len() < PASSWORD_MIN_CHARS {
        chars.push(all.choose(&mut rng).copied().unwrap_or(b'x'));
    }
    chars.shuffle(&mut rng);
    Zeroizing::new(chars.into_iter().map(char::from).collect())
}

/// Validated email/password credentials.
///
/// ## Invariants
/// - `email` is trimmed and shaped like an address.
/// - `password` is non-empty and keeps caller-provided whitespace to avoid
///   surprising credential comparisons.
///
/// # Examples
/// ```
/// use fictures::domain::Credentials;
///
/// let creds = Credentials::for_sign_in(" ada@example.com ", "secret").expect("valid");
/// assert_eq!(creds.email().as_str(), "ada@example.com");
/// assert!(Credentials::for_sign_up("ada@example.com", "secret").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    email: Email,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Credentials for signing in: the password only has to be present.
    ///
    /// # Errors
    /// Returns a [`CredentialsValidationError`] for malformed input.
    pub fn for_sign_in(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Credentials for signing up: the password must satisfy the policy.
    ///
    /// # Errors
    /// Returns a [`CredentialsValidationError`] for malformed input or a weak
    /// password.
    pub fn for_sign_up(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let creds = Self::for_sign_in(email, password)?;
        if !is_strong_password(password) {
            return Err(CredentialsValidationError::WeakPassword {
                min: PASSWORD_MIN_CHARS,
            });
        }
        Ok(creds)
    }

    /// Email address.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Password provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Bearer token issued by the hosted auth service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Raw token for `Authorization` headers.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Single-use token that buys a new [`AccessToken`] once the old one
/// expires.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(Zeroizing<String>);

impl RefreshToken {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Raw token for the refresh grant.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshToken(<redacted>)")
    }
}

/// Tokens expiring within this many seconds are renewed before use.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 30;

/// Session issued by the hosted auth service and kept in the cookie.
///
/// Cookies written before renewal support lack the refresh fields and
/// decode with neither set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    user_id: UserId,
    access_token: AccessToken,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<RefreshToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<Email>,
    #[serde(default)]
    anonymous: bool,
}

impl AuthSession {
    /// Session for an email/password account.
    #[must_use]
    pub const fn authenticated(user_id: UserId, access_token: AccessToken, email: Email) -> Self {
        Self {
            user_id,
            access_token,
            refresh_token: None,
            expires_at: None,
            email: Some(email),
            anonymous: false,
        }
    }

    /// Session for an anonymous sign-in.
    #[must_use]
    pub const fn anonymous(user_id: UserId, access_token: AccessToken) -> Self {
        Self {
            user_id,
            access_token,
            refresh_token: None,
            expires_at: None,
            email: None,
            anonymous: true,
        }
    }

    /// Hosted user id.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Bearer token.
    #[must_use]
    pub const fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// Attach the refresh token and access-token expiry from a grant.
    #[must_use]
    pub fn with_refresh(
        mut self,
        refresh_token: RefreshToken,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.refresh_token = Some(refresh_token);
        self.expires_at = expires_at;
        self
    }

    /// Same user and account kind, authorised by a renewed grant.
    #[must_use]
    pub fn renewed(&self, grant: Self) -> Self {
        Self {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at: grant.expires_at,
            ..self.clone()
        }
    }

    /// The same user, now holding email/password credentials.
    #[must_use]
    pub fn into_authenticated(self, email: Email) -> Self {
        Self {
            email: Some(email),
            anonymous: false,
            ..self
        }
    }

    /// The same tokens, classified as an anonymous user.
    #[must_use]
    pub fn into_anonymous(self) -> Self {
        Self {
            email: None,
            anonymous: true,
            ..self
        }
    }

    /// Token used to renew the session, if the service issued one.
    #[must_use]
    pub const fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    /// When the access token stops being accepted, if known.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the access token is expired, or will be within
    /// [`TOKEN_EXPIRY_MARGIN_SECS`], at `now`.
    #[must_use]
    pub fn is_expiring(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| {
            now.checked_add_signed(TimeDelta::seconds(TOKEN_EXPIRY_MARGIN_SECS))
                .is_none_or(|deadline| expires_at <= deadline)
        })
    }

    /// Email of an authenticated account.
    #[must_use]
    pub const fn email(&self) -> Option<&Email> {
        self.email.as_ref()
    }

    /// Whether the session belongs to an anonymous user.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// Acting user for writes made with this session.
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id.clone(), self.access_token.clone())
    }
}

/// Result of a sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The account is usable immediately.
    SessionIssued(AuthSession),
    /// The hosted service sent a confirmation email first.
    VerificationPending {
        /// Address the confirmation was sent to.
        email: Email,
    },
}

/// Who is making the current request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    /// No session.
    #[default]
    Guest,
    /// Anonymous hosted session.
    Anonymous(AuthSession),
    /// Email/password hosted session.
    Authenticated(AuthSession),
}

impl Identity {
    /// Classify a stored session.
    #[must_use]
    pub fn from_session(session: Option<AuthSession>) -> Self {
        match session {
            None => Self::Guest,
            Some(session) if session.is_anonymous() => Self::Anonymous(session),
            Some(session) => Self::Authenticated(session),
        }
    }

    /// The underlying session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&AuthSession> {
        match self {
            Self::Guest => None,
            Self::Anonymous(session) | Self::Authenticated(session) => Some(session),
        }
    }

    /// Hosted user id, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.session().map(AuthSession::user_id)
    }

    /// Email of an authenticated caller.
    #[must_use]
    pub fn email(&self) -> Option<&Email> {
        self.session().and_then(AuthSession::email)
    }

    /// Whether the caller wrote `post`.
    #[must_use]
    pub fn owns(&self, post: &Post) -> bool {
        self.user_id() == Some(post.user_id())
    }
}

/// User on whose behalf a write is performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    user_id: UserId,
    access_token: AccessToken,
}

impl Actor {
    /// Build an actor from its parts.
    #[must_use]
    pub const fn new(user_id: UserId, access_token: AccessToken) -> Self {
        Self {
            user_id,
            access_token,
        }
    }

    /// Author id recorded on writes.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Token authorising the write.
    #[must_use]
    pub const fn access_token(&self) -> &AccessToken {
        &self.access_token
    }
}
