//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{InMemoryAuthProvider, InMemoryPostRepository};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Clock pinned to one instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Instant used by [`FixedClock`] in handler tests.
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Handler state over the given in-memory adapters.
pub fn memory_state(
    posts: Arc<InMemoryPostRepository>,
    auth: Arc<InMemoryAuthProvider>,
) -> HttpState {
    HttpState::from(HttpStatePorts {
        posts,
        auth,
        clock: Arc::new(FixedClock(fixture_now())),
    })
}

/// Session cookie set by `response`, if any.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// `Location` header of a redirect.
pub fn location<B>(response: &ServiceResponse<B>) -> Option<String> {
    response
        .headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}
