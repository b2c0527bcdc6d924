//! Cookie session settings read from the environment.
//!
//! Release builds insist on explicit, safe values. Debug builds fall back to
//! development defaults and log a warning for every toggle they had to guess,
//! so `fictures serve` works on a laptop without a key file.

pub mod fingerprint;
mod parsing;

use std::path::PathBuf;

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroize;

use parsing::{BoolToggle, lenient_or_error, parse_bool_toggle, parse_same_site, parse_ttl_hours};

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const DEFAULT_TTL_HOURS: i64 = 24 * 7;
pub(crate) const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
pub(crate) const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
pub(crate) const SAMESITE_ENV: &str = "SESSION_SAMESITE";
pub(crate) const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
pub(crate) const TTL_HOURS_ENV: &str = "SESSION_TTL_HOURS";

/// How strictly the session toggles are validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Missing or malformed toggles fall back to defaults with a warning.
    Debug,
    /// Missing or malformed toggles are errors.
    Release,
}

impl BuildMode {
    /// Mode matching the current compilation profile.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fictures::inbound::http::session_config::BuildMode;
    ///
    /// let expected = if cfg!(debug_assertions) {
    ///     BuildMode::Debug
    /// } else {
    ///     BuildMode::Release
    /// };
    /// assert_eq!(BuildMode::from_debug_assertions(), expected);
    /// ```
    #[must_use]
    pub const fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    const fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Everything the session middleware needs.
pub struct SessionSettings {
    /// Signing and encryption key for the session cookie.
    pub key: Key,
    /// Whether the cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// `SameSite` policy for the cookie.
    pub same_site: SameSite,
    /// Lifetime of the persistent cookie.
    pub ttl: Duration,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Value found.
        value: String,
        /// Description of the accepted values.
        expected: &'static str,
    },
    /// The key file could not be read.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        /// Key file location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The key file holds too little material for a release build.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        /// Key file location.
        path: PathBuf,
        /// Bytes read.
        length: usize,
        /// Bytes required.
        min_len: usize,
    },
    /// `SameSite=None` without `Secure` is refused by browsers.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Release builds must not sign cookies with a throwaway key.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Build session settings from environment variables.
///
/// # Errors
/// Returns [`SessionConfigError`] when a release build is missing a toggle,
/// a toggle is malformed, or the key file is unusable.
///
/// # Examples
///
/// ```rust
/// use fictures::inbound::http::session_config::{BuildMode, session_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
///
/// let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
/// assert!(settings.cookie_secure);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = parse_bool_toggle(env, mode, BoolToggle::new(COOKIE_SECURE_ENV, true))?;
    let same_site = parse_same_site(env, mode, cookie_secure)?;
    let allow_ephemeral = parse_bool_toggle(env, mode, BoolToggle::new(ALLOW_EPHEMERAL_ENV, false))?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let ttl = Duration::hours(parse_ttl_hours(env, mode, DEFAULT_TTL_HOURS)?);
    let key = load_key(env, mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
        ttl,
    })
}

fn load_key<E: Env>(env: &E, mode: BuildMode, allow_ephemeral: bool) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );
    let mut bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(source) if allow_ephemeral || mode.is_debug() => {
            warn!(path = %path.display(), error = %source, "using temporary session key (dev only)");
            return Ok(Key::generate());
        }
        Err(source) => return Err(SessionConfigError::KeyRead { path, source }),
    };
    let length = bytes.len();
    if length < SESSION_KEY_MIN_LEN {
        bytes.zeroize();
        return lenient_or_error(
            mode,
            Key::generate(),
            SessionConfigError::KeyTooShort {
                path: path.clone(),
                length,
                min_len: SESSION_KEY_MIN_LEN,
            },
            || warn!(path = %path.display(), length, "session key too short; using temporary key"),
        );
    }
    let key = Key::derive_from(&bytes);
    bytes.zeroize();
    Ok(key)
}

#[cfg(test)]
mod tests;
