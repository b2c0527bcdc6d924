//! Reqwest-backed post repository over the hosted REST API.
//!
//! This adapter owns transport details only: PostgREST filters and
//! preferences, bearer headers, HTTP error mapping and row decoding.

use async_trait::async_trait;
use pagination::PageRequest;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::HostedClient;
use super::dto::{NewPostDto, PostPatchDto, PostRowDto};
use super::http_errors::{status_message, transport_message};
use crate::domain::ports::{PostRepository, PostStoreError, WriteOutcome};
use crate::domain::{Actor, Post, PostDraft, PostId};

const PREFER_REPRESENTATION: &str = "return=representation";

/// Post repository backed by the hosted posts table.
#[derive(Clone)]
pub struct HostedPostRepository {
    client: HostedClient,
}

impl HostedPostRepository {
    /// Wrap a shared hosted client.
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }

    fn table(&self, method: Method, actor: Option<&Actor>) -> RequestBuilder {
        self.client.request(
            method,
            self.client.posts_url().clone(),
            actor.map(Actor::access_token),
        )
    }
}

/// PostgREST equality filter.
fn eq(value: &str) -> String {
    format!("eq.{value}")
}

async fn send_rows<T: DeserializeOwned>(request: RequestBuilder) -> Result<Vec<T>, PostStoreError> {
    let response = request
        .send()
        .await
        .map_err(|err| PostStoreError::connection(transport_message(&err)))?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| PostStoreError::connection(transport_message(&err)))?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    serde_json::from_slice(body.as_ref())
        .map_err(|err| PostStoreError::decode(format!("invalid posts payload: {err}")))
}

fn into_posts(rows: Vec<PostRowDto>) -> Result<Vec<Post>, PostStoreError> {
    rows.into_iter()
        .map(|row| row.into_domain().map_err(PostStoreError::decode))
        .collect()
}

fn write_outcome(rows: &[PostRowDto]) -> WriteOutcome {
    if rows.is_empty() {
        WriteOutcome::NoMatch
    } else {
        WriteOutcome::Applied
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PostStoreError {
    let message = status_message(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PostStoreError::unauthorized(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            PostStoreError::connection(message)
        }
        _ if status.is_client_error() => PostStoreError::rejected(message),
        _ => PostStoreError::connection(message),
    }
}

#[async_trait]
impl PostRepository for HostedPostRepository {
    async fn list(&self, window: PageRequest) -> Result<Vec<Post>, PostStoreError> {
        debug!(offset = window.offset(), limit = window.size(), "listing posts");
        let request = self.table(Method::GET, None).query(&[
            ("select", "*".to_owned()),
            ("order", "created_at.desc".to_owned()),
            ("offset", window.offset().to_string()),
            ("limit", window.size().to_string()),
        ]);
        into_posts(send_rows(request).await?)
    }

    async fn find(&self, id: &PostId) -> Result<Option<Post>, PostStoreError> {
        let request = self.table(Method::GET, None).query(&[
            ("select", "*".to_owned()),
            ("id", eq(id.as_str())),
            ("limit", "1".to_owned()),
        ]);
        Ok(into_posts(send_rows(request).await?)?.into_iter().next())
    }

    async fn insert(&self, actor: &Actor, draft: &PostDraft) -> Result<Post, PostStoreError> {
        let payload = NewPostDto {
            title: draft.title().as_str(),
            content: draft.content().as_str(),
            user_id: actor.user_id().as_str(),
        };
        let request = self
            .table(Method::POST, Some(actor))
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&payload);
        into_posts(send_rows(request).await?)?
            .into_iter()
            .next()
            .ok_or_else(|| PostStoreError::decode("insert returned no row"))
    }

    async fn update(
        &self,
        actor: &Actor,
        id: &PostId,
        draft: &PostDraft,
    ) -> Result<WriteOutcome, PostStoreError> {
        let request = self
            .table(Method::PATCH, Some(actor))
            .query(&[
                ("id", eq(id.as_str())),
                ("user_id", eq(actor.user_id().as_str())),
            ])
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&PostPatchDto::from(draft));
        let rows: Vec<PostRowDto> = send_rows(request).await?;
        Ok(write_outcome(&rows))
    }

    async fn delete(&self, actor: &Actor, id: &PostId) -> Result<WriteOutcome, PostStoreError> {
        let request = self
            .table(Method::DELETE, Some(actor))
            .query(&[
                ("id", eq(id.as_str())),
                ("user_id", eq(actor.user_id().as_str())),
            ])
            .header("Prefer", PREFER_REPRESENTATION);
        let rows: Vec<PostRowDto> = send_rows(request).await?;
        Ok(write_outcome(&rows))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::unauthorized(StatusCode::UNAUTHORIZED, "Unauthorized")]
    #[case::forbidden(StatusCode::FORBIDDEN, "Unauthorized")]
    #[case::bad_request(StatusCode::BAD_REQUEST, "Rejected")]
    #[case::too_many(StatusCode::TOO_MANY_REQUESTS, "Connection")]
    #[case::server_error(StatusCode::SERVICE_UNAVAILABLE, "Connection")]
    fn maps_http_statuses_to_store_errors(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status, b"{\"message\":\"JWT expired\"}");
        let matched = match expected {
            "Unauthorized" => matches!(error, PostStoreError::Unauthorized { .. }),
            "Rejected" => matches!(error, PostStoreError::Rejected { .. }),
            "Connection" => matches!(error, PostStoreError::Connection { .. }),
            _ => panic!("unsupported test expectation: {expected}"),
        };
        assert!(matched, "{status} mapped to {error:?}");
    }

    #[rstest]
    fn status_errors_keep_a_body_preview() {
        let error = map_status_error(StatusCode::BAD_REQUEST, b"{\"message\": \"bad\"}");
        assert!(error.to_string().contains("status 400"));
        assert!(error.to_string().contains("bad"));
    }

    #[rstest]
    fn empty_representation_means_no_match() {
        assert_eq!(write_outcome(&[]), WriteOutcome::NoMatch);
        let row: PostRowDto = serde_json::from_str(
            r#"{"id":"1","title":"t","content":"c","user_id":"u","created_at":"2024-05-01T10:00:00Z"}"#,
        )
        .expect("row decodes");
        assert_eq!(write_outcome(&[row]), WriteOutcome::Applied);
    }

    #[rstest]
    fn filters_use_postgrest_equality() {
        assert_eq!(eq("abc123"), "eq.abc123");
    }
}
