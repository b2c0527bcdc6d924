//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix cookie session so handlers only deal with domain types:
//! the hosted [`AuthSession`] that identifies the caller and a one-shot
//! [`Flash`] notification shown on the next rendered page.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{AuthSession, Error, Identity};

pub(crate) const AUTH_KEY: &str = "auth";
pub(crate) const FLASH_KEY: &str = "flash";

/// Severity of a flash notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    /// The action went through.
    Success,
    /// The action failed.
    Error,
}

impl FlashLevel {
    /// CSS modifier used by the banner.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// One-shot notification carried across a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    level: FlashLevel,
    message: String,
}

impl Flash {
    /// Notification for a completed action.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    /// Notification for a failed action.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    /// Severity.
    #[must_use]
    pub const fn level(&self) -> FlashLevel {
        self.level
    }

    /// Text shown to the user.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Classify the caller from the stored hosted session.
    ///
    /// A cookie whose payload no longer decodes is dropped and the caller
    /// treated as a guest.
    pub fn identity(&self) -> Identity {
        match self.0.get::<AuthSession>(AUTH_KEY) {
            Ok(session) => Identity::from_session(session),
            Err(error) => {
                warn!(%error, "discarding unreadable auth session");
                self.0.remove(AUTH_KEY);
                Identity::Guest
            }
        }
    }

    /// Store a hosted session and rotate the cookie.
    pub fn persist_session(&self, session: &AuthSession) -> Result<(), Error> {
        self.0
            .insert(AUTH_KEY, session)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))?;
        self.0.renew();
        Ok(())
    }

    /// Forget the hosted session while keeping any pending flash.
    pub fn clear_identity(&self) {
        self.0.remove(AUTH_KEY);
        self.0.renew();
    }

    /// Queue a notification for the next rendered page.
    pub fn set_flash(&self, flash: Flash) -> Result<(), Error> {
        self.0
            .insert(FLASH_KEY, flash)
            .map_err(|error| Error::internal(format!("failed to persist flash: {error}")))
    }

    /// Remove and return the pending notification.
    pub fn take_flash(&self) -> Option<Flash> {
        match self.0.remove_as::<Flash>(FLASH_KEY)? {
            Ok(flash) => Some(flash),
            Err(raw) => {
                warn!(raw = %raw, "discarding unreadable flash message");
                None
            }
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
