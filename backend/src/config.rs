//! Application settings loaded via OrthoConfig.
//!
//! Values come from `FICTURES_*` environment variables or a config file.
//! Without `backend_url` the server runs against in-memory adapters, which is
//! how local development and the test suite work.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::outbound::hosted::HostedConfig;

const DEFAULT_BIND_PORT: u16 = 8080;
const DEFAULT_POSTS_TABLE: &str = "posts";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `backend_url` is not an absolute URL.
    #[error("invalid backend url `{url}`: {source}")]
    InvalidBackendUrl {
        /// Value as configured.
        url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
    /// `backend_url` was given without an API key.
    #[error("FICTURES_BACKEND_API_KEY is required when FICTURES_BACKEND_URL is set")]
    MissingApiKey,
    /// A zero timeout would fail every request.
    #[error("request_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

/// Runtime settings for the server and the CLI.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FICTURES")]
pub struct AppSettings {
    /// Interface to listen on.
    pub bind_host: Option<IpAddr>,
    /// Port to listen on.
    pub bind_port: Option<u16>,
    /// Hosted backend project URL.
    pub backend_url: Option<String>,
    /// Public API key of the hosted project.
    pub backend_api_key: Option<String>,
    /// Table holding posts.
    pub posts_table: Option<String>,
    /// Timeout applied to every hosted request.
    pub request_timeout_secs: Option<u64>,
    /// Seed the in-memory store with demo posts.
    #[ortho_config(default = false)]
    pub seed_demo: bool,
}

impl std::fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSettings")
            .field("bind_host", &self.bind_host)
            .field("bind_port", &self.bind_port)
            .field("backend_url", &self.backend_url)
            .field(
                "backend_api_key",
                &self.backend_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("posts_table", &self.posts_table)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("seed_demo", &self.seed_demo)
            .finish()
    }
}

impl AppSettings {
    /// Socket address the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.bind_host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.bind_port.unwrap_or(DEFAULT_BIND_PORT),
        )
    }

    /// Configured table, falling back to `posts`.
    #[must_use]
    pub fn posts_table(&self) -> &str {
        self.posts_table.as_deref().unwrap_or(DEFAULT_POSTS_TABLE)
    }

    /// Per-request timeout for hosted calls.
    ///
    /// # Errors
    /// Returns [`SettingsError::ZeroTimeout`] for a zero timeout.
    pub fn request_timeout(&self) -> Result<Duration, SettingsError> {
        match self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS) {
            0 => Err(SettingsError::ZeroTimeout),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    /// Hosted connection settings, or `None` to run in memory.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when the URL is malformed, the API key is
    /// missing, or the timeout is zero.
    pub fn hosted(&self) -> Result<Option<HostedConfig>, SettingsError> {
        let Some(raw) = self.backend_url.as_deref().map(str::trim).filter(|u| !u.is_empty())
        else {
            return Ok(None);
        };
        let base_url = Url::parse(raw).map_err(|source| SettingsError::InvalidBackendUrl {
            url: raw.to_owned(),
            source,
        })?;
        let api_key = self
            .backend_api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(SettingsError::MissingApiKey)?;
        Ok(Some(HostedConfig {
            base_url,
            api_key: Zeroizing::new(api_key),
            posts_table: self.posts_table().to_owned(),
            timeout: self.request_timeout()?,
        }))
    }
}
