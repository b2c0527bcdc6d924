//! Adapters for the hosted backend-as-a-service.
//!
//! The service exposes a PostgREST-style REST API over the posts table and a
//! GoTrue-style auth API. Both adapters share one [`HostedClient`] so they
//! reuse the connection pool, the request timeout and the API key headers.

mod auth;
mod dto;
mod http_errors;
mod rest;

use std::fmt;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use zeroize::Zeroizing;

use crate::domain::AccessToken;

pub use auth::HostedAuthProvider;
pub use rest::HostedPostRepository;

/// Header carrying the project API key on every request.
const API_KEY_HEADER: &str = "apikey";

/// Errors raised while building the hosted client.
#[derive(Debug, thiserror::Error)]
pub enum HostedSetupError {
    /// The base URL cannot carry path segments.
    #[error("hosted backend url `{url}` cannot be used as a base")]
    InvalidBaseUrl {
        /// URL as configured.
        url: String,
    },
    /// The table name is blank or not a single path segment.
    #[error("table name `{table}` is not a valid path segment")]
    InvalidTable {
        /// Table name as configured.
        table: String,
    },
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection settings for the hosted service.
pub struct HostedConfig {
    /// Project URL, for example `https://xyz.supabase.co`.
    pub base_url: Url,
    /// Public (anon) API key.
    pub api_key: Zeroizing<String>,
    /// Table holding posts.
    pub posts_table: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl fmt::Debug for HostedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("posts_table", &self.posts_table)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Auth API endpoints.
#[derive(Debug, Clone)]
pub(crate) struct AuthEndpoints {
    pub(crate) signup: Url,
    pub(crate) token: Url,
    pub(crate) user: Url,
    pub(crate) logout: Url,
}

/// Shared HTTP client for the hosted REST and auth APIs.
#[derive(Clone)]
pub struct HostedClient {
    client: Client,
    posts_url: Url,
    auth: AuthEndpoints,
    api_key: Zeroizing<String>,
}

impl HostedClient {
    /// Build a client with the configured timeout.
    ///
    /// # Errors
    /// Returns [`HostedSetupError`] for unusable URLs or table names, or when
    /// the reqwest client cannot be constructed.
    pub fn new(config: HostedConfig) -> Result<Self, HostedSetupError> {
        let table = config.posts_table.trim();
        if table.is_empty() || table.contains('/') {
            return Err(HostedSetupError::InvalidTable {
                table: config.posts_table.clone(),
            });
        }
        let posts_url = endpoint(&config.base_url, &["rest", "v1", table])?;
        let auth = AuthEndpoints {
            signup: endpoint(&config.base_url, &["auth", "v1", "signup"])?,
            token: endpoint(&config.base_url, &["auth", "v1", "token"])?,
            user: endpoint(&config.base_url, &["auth", "v1", "user"])?,
            logout: endpoint(&config.base_url, &["auth", "v1", "logout"])?,
        };
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            posts_url,
            auth,
            api_key: config.api_key,
        })
    }

    /// Endpoint of the posts table.
    pub(crate) fn posts_url(&self) -> &Url {
        &self.posts_url
    }

    /// Auth API endpoints.
    pub(crate) const fn auth(&self) -> &AuthEndpoints {
        &self.auth
    }

    /// Request with API key and bearer headers. Without a user token the API
    /// key doubles as the bearer, which the service treats as the anon role.
    pub(crate) fn request(
        &self,
        method: Method,
        url: Url,
        token: Option<&AccessToken>,
    ) -> RequestBuilder {
        let bearer = token.map_or(self.api_key.as_str(), AccessToken::expose);
        self.client
            .request(method, url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .bearer_auth(bearer)
            .header(reqwest::header::ACCEPT, "application/json")
    }
}

fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, HostedSetupError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| HostedSetupError::InvalidBaseUrl {
            url: base.to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn config(base: &str, table: &str) -> HostedConfig {
        HostedConfig {
            base_url: Url::parse(base).expect("valid url"),
            api_key: Zeroizing::new("anon-key".to_owned()),
            posts_table: table.to_owned(),
            timeout: Duration::from_secs(5),
        }
    }

    #[rstest]
    #[case("https://xyz.supabase.co", "https://xyz.supabase.co/rest/v1/posts")]
    #[case("https://xyz.supabase.co/", "https://xyz.supabase.co/rest/v1/posts")]
    #[case("http://localhost:54321/proxy/", "http://localhost:54321/proxy/rest/v1/posts")]
    fn builds_table_endpoint(#[case] base: &str, #[case] expected: &str) {
        let client = HostedClient::new(config(base, "posts")).expect("client builds");
        assert_eq!(client.posts_url().as_str(), expected);
    }

    #[rstest]
    fn builds_auth_endpoints() {
        let client = HostedClient::new(config("https://xyz.supabase.co", "posts")).expect("client");
        assert_eq!(
            client.auth().token.as_str(),
            "https://xyz.supabase.co/auth/v1/token"
        );
        assert_eq!(
            client.auth().logout.as_str(),
            "https://xyz.supabase.co/auth/v1/logout"
        );
    }

    #[rstest]
    #[case("")]
    #[case("a/b")]
    fn rejects_bad_table_names(#[case] table: &str) {
        let result = HostedClient::new(config("https://xyz.supabase.co", table));
        assert!(matches!(result, Err(HostedSetupError::InvalidTable { .. })));
    }

    #[rstest]
    fn rejects_cannot_be_a_base_urls() {
        let result = HostedClient::new(config("mailto:ops@example.com", "posts"));
        assert!(matches!(result, Err(HostedSetupError::InvalidBaseUrl { .. })));
    }

    #[rstest]
    fn debug_output_redacts_the_api_key() {
        let rendered = format!("{:?}", config("https://xyz.supabase.co", "posts"));
        assert!(!rendered.contains("anon-key"));
    }

    #[rstest]
    fn requests_carry_api_key_and_bearer() {
        let client = HostedClient::new(config("https://xyz.supabase.co", "posts")).expect("client");
        let token = AccessToken::new("user-jwt");
        let request = client
            .request(Method::GET, client.posts_url().clone(), Some(&token))
            .build()
            .expect("request builds");
        assert_eq!(
            request.headers().get("apikey").and_then(|v| v.to_str().ok()),
            Some("anon-key")
        );
        assert_eq!(
            request
                .headers()
                .get(reqwest::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok()),
            Some("Bearer user-jwt")
        );
    }
}
