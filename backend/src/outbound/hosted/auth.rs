//! Reqwest-backed auth provider over the hosted auth API.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::HostedClient;
use super::dto::{AuthErrorDto, AuthUserDto, CredentialsDto, RefreshGrantDto, SessionDto, SignUpDto};
use super::http_errors::{status_message, transport_message};
use crate::domain::ports::{AuthProvider, AuthProviderError};
use crate::domain::{AccessToken, AuthSession, Credentials, SignUpOutcome};

const INVALID_CREDENTIAL_CODES: [&str; 2] = ["invalid_credentials", "invalid_grant"];
const TAKEN_EMAIL_CODES: [&str; 3] = ["user_already_exists", "email_exists", "email_address_taken"];

/// Auth provider backed by the hosted auth API.
#[derive(Clone)]
pub struct HostedAuthProvider {
    client: HostedClient,
}

impl HostedAuthProvider {
    /// Wrap a shared hosted client.
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }
}

async fn fetch(request: RequestBuilder) -> Result<(StatusCode, Vec<u8>), AuthProviderError> {
    let response = request
        .send()
        .await
        .map_err(|err| AuthProviderError::connection(transport_message(&err)))?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| AuthProviderError::connection(transport_message(&err)))?;
    Ok((status, body.to_vec()))
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, AuthProviderError> {
    serde_json::from_slice(body)
        .map_err(|err| AuthProviderError::decode(format!("invalid auth payload: {err}")))
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, AuthProviderError> {
    let (status, body) = fetch(request).await?;
    if !status.is_success() {
        return Err(map_status_error(status, &body));
    }
    decode(&body)
}

/// A refused refresh grant means the session is gone; throttling and
/// server failures keep their usual mapping so the caller can retry.
fn map_refresh_error(status: StatusCode, body: &[u8]) -> AuthProviderError {
    if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
        return AuthProviderError::session_expired();
    }
    map_status_error(status, body)
}

fn map_status_error(status: StatusCode, body: &[u8]) -> AuthProviderError {
    let error = AuthErrorDto::parse(body);
    let code = error.code().unwrap_or_default();
    if INVALID_CREDENTIAL_CODES.contains(&code) {
        return AuthProviderError::invalid_credentials();
    }
    let already_registered = error
        .message()
        .is_some_and(|message| message.contains("already registered"));
    if TAKEN_EMAIL_CODES.contains(&code) || already_registered {
        return AuthProviderError::already_registered();
    }
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            AuthProviderError::rejected("Too many attempts, try again later")
        }
        _ if status.is_client_error() => AuthProviderError::rejected(
            error
                .message()
                .map_or_else(|| status_message(status, body), str::to_owned),
        ),
        _ => AuthProviderError::connection(status_message(status, body)),
    }
}

fn sign_up_outcome(
    dto: SignUpDto,
    credentials: &Credentials,
) -> Result<SignUpOutcome, AuthProviderError> {
    match dto {
        SignUpDto::Session(session) => session
            .into_session()
            .map(SignUpOutcome::SessionIssued)
            .map_err(AuthProviderError::decode),
        SignUpDto::PendingUser(user) => Ok(SignUpOutcome::VerificationPending {
            email: user.address().unwrap_or_else(|| credentials.email().clone()),
        }),
    }
}

/// The user endpoint answers an upgrade with the updated user. The address
/// only becomes the account email once confirmed; until then it sits in
/// `new_email`.
fn upgrade_outcome(
    user: AuthUserDto,
    session: &AuthSession,
    credentials: &Credentials,
) -> Result<SignUpOutcome, AuthProviderError> {
    let user_id = user.user_id().map_err(AuthProviderError::decode)?;
    if &user_id != session.user_id() {
        return Err(AuthProviderError::decode(
            "upgrade returned a different user",
        ));
    }
    if user.has_pending_email() {
        return Ok(SignUpOutcome::VerificationPending {
            email: credentials.email().clone(),
        });
    }
    Ok(SignUpOutcome::SessionIssued(
        session.clone().into_authenticated(credentials.email().clone()),
    ))
}

/// The renewed grant must belong to the user it was issued for.
fn renewed_session(
    grant: SessionDto,
    session: &AuthSession,
) -> Result<AuthSession, AuthProviderError> {
    let grant = grant.into_session().map_err(AuthProviderError::decode)?;
    if grant.user_id() != session.user_id() {
        return Err(AuthProviderError::decode(
            "refresh returned a different user",
        ));
    }
    Ok(session.renewed(grant))
}

#[async_trait]
impl AuthProvider for HostedAuthProvider {
    async fn sign_in_anonymously(&self) -> Result<AuthSession, AuthProviderError> {
        let request = self
            .client
            .request(Method::POST, self.client.auth().signup.clone(), None)
            .json(&json!({ "data": {} }));
        let grant: SessionDto = send_json(request).await?;
        grant
            .into_session()
            .map(AuthSession::into_anonymous)
            .map_err(AuthProviderError::decode)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, AuthProviderError> {
        let request = self
            .client
            .request(Method::POST, self.client.auth().signup.clone(), None)
            .json(&CredentialsDto::from(credentials));
        let dto: SignUpDto = send_json(request).await?;
        sign_up_outcome(dto, credentials)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthProviderError> {
        let request = self
            .client
            .request(Method::POST, self.client.auth().token.clone(), None)
            .query(&[("grant_type", "password")])
            .json(&CredentialsDto::from(credentials));
        let grant: SessionDto = send_json(request).await?;
        grant.into_session().map_err(AuthProviderError::decode)
    }

    async fn upgrade_anonymous(
        &self,
        session: &AuthSession,
        credentials: &Credentials,
    ) -> Result<SignUpOutcome, AuthProviderError> {
        let request = self
            .client
            .request(
                Method::PUT,
                self.client.auth().user.clone(),
                Some(session.access_token()),
            )
            .json(&CredentialsDto::from(credentials));
        let user: AuthUserDto = send_json(request).await?;
        upgrade_outcome(user, session, credentials)
    }

    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession, AuthProviderError> {
        let Some(refresh_token) = session.refresh_token() else {
            return Err(AuthProviderError::session_expired());
        };
        let request = self
            .client
            .request(Method::POST, self.client.auth().token.clone(), None)
            .query(&[("grant_type", "refresh_token")])
            .json(&RefreshGrantDto {
                refresh_token: refresh_token.expose(),
            });
        let (status, body) = fetch(request).await?;
        if !status.is_success() {
            return Err(map_refresh_error(status, &body));
        }
        renewed_session(decode(&body)?, session)
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthProviderError> {
        let response = self
            .client
            .request(Method::POST, self.client.auth().logout.clone(), Some(token))
            .send()
            .await
            .map_err(|err| AuthProviderError::connection(transport_message(&err)))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.unwrap_or_default();
        Err(map_status_error(status, body.as_ref()))
    }
}
