//! Toggle parsing shared by the session settings.

use actix_web::cookie::SameSite;
use mockable::Env;
use tracing::warn;

use super::{BuildMode, SAMESITE_ENV, SessionConfigError, TTL_HOURS_ENV};

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";
const TTL_EXPECTED: &str = "a positive number of hours";

/// A boolean toggle and the value debug builds assume when it is unusable.
pub(super) struct BoolToggle {
    name: &'static str,
    fallback: bool,
}

impl BoolToggle {
    pub(super) const fn new(name: &'static str, fallback: bool) -> Self {
        Self { name, fallback }
    }
}

/// Fall back in debug builds, fail in release builds.
pub(super) fn lenient_or_error<T>(
    mode: BuildMode,
    fallback: T,
    error: SessionConfigError,
    warn_fn: impl FnOnce(),
) -> Result<T, SessionConfigError> {
    if mode.is_debug() {
        warn_fn();
        Ok(fallback)
    } else {
        Err(error)
    }
}

pub(super) fn parse_bool_toggle<E: Env>(
    env: &E,
    mode: BuildMode,
    toggle: BoolToggle,
) -> Result<bool, SessionConfigError> {
    let Some(value) = env.string(toggle.name) else {
        return lenient_or_error(
            mode,
            toggle.fallback,
            SessionConfigError::MissingEnv { name: toggle.name },
            || warn!(name = toggle.name, fallback = toggle.fallback, "session toggle not set"),
        );
    };
    if let Some(flag) = parse_bool(&value) {
        return Ok(flag);
    }
    lenient_or_error(
        mode,
        toggle.fallback,
        SessionConfigError::InvalidEnv {
            name: toggle.name,
            value: value.clone(),
            expected: BOOL_EXPECTED,
        },
        || warn!(name = toggle.name, value = %value, fallback = toggle.fallback, "invalid session toggle"),
    )
}

pub(super) fn parse_same_site<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let fallback = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let Some(value) = env.string(SAMESITE_ENV) else {
        return lenient_or_error(
            mode,
            fallback,
            SessionConfigError::MissingEnv { name: SAMESITE_ENV },
            || warn!("SESSION_SAMESITE not set; using Lax"),
        );
    };
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => lenient_or_error(
            mode,
            SameSite::None,
            SessionConfigError::InsecureSameSiteNone,
            || warn!("SESSION_SAMESITE=None without a secure cookie; browsers may drop it"),
        ),
        _ => lenient_or_error(
            mode,
            fallback,
            SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value: value.clone(),
                expected: SAMESITE_EXPECTED,
            },
            || warn!(value = %value, "invalid SESSION_SAMESITE; using Lax"),
        ),
    }
}

/// Cookie lifetime in hours. Optional in every build mode.
pub(super) fn parse_ttl_hours<E: Env>(
    env: &E,
    mode: BuildMode,
    fallback: i64,
) -> Result<i64, SessionConfigError> {
    let Some(value) = env.string(TTL_HOURS_ENV) else {
        return Ok(fallback);
    };
    match value.trim().parse::<u16>() {
        Ok(hours) if hours > 0 => Ok(i64::from(hours)),
        _ => lenient_or_error(
            mode,
            fallback,
            SessionConfigError::InvalidEnv {
                name: TTL_HOURS_ENV,
                value: value.clone(),
                expected: TTL_EXPECTED,
            },
            || warn!(value = %value, fallback, "invalid SESSION_TTL_HOURS; using default"),
        ),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
