//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use fictures::config::{AppSettings, SettingsError};
use fictures::inbound::http::session_config::SessionSettings;
use fictures::outbound::hosted::HostedConfig;

/// Where posts and accounts live.
#[derive(Debug)]
pub enum Backend {
    /// The hosted REST and auth APIs.
    Hosted(HostedConfig),
    /// Process memory, optionally pre-filled with demo posts.
    InMemory {
        /// Fill the store with demo posts at start-up.
        seed_demo: bool,
    },
}

impl Backend {
    /// Pick the backend described by `settings`.
    ///
    /// # Errors
    /// Propagates [`SettingsError`] for unusable hosted settings.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, SettingsError> {
        Ok(settings.hosted()?.map_or(
            Self::InMemory {
                seed_demo: settings.seed_demo,
            },
            Self::Hosted,
        ))
    }
}

/// Everything `create_server` needs.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) backend: Backend,
}

impl ServerConfig {
    /// Combine session settings with the application settings.
    ///
    /// # Errors
    /// Propagates [`SettingsError`] for unusable hosted settings.
    pub fn new(settings: &AppSettings, session: SessionSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            session,
            bind_addr: settings.bind_addr(),
            backend: Backend::from_settings(settings)?,
        })
    }

    /// Socket address the server will bind to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
