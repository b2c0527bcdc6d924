//! Tests for HTTP error mapping.

use super::*;
use crate::domain::Error;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn internal_error_case(expected_trace_id: String) -> Error {
    Error::internal("connection string postgres://secret@db")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"secret": "x"}))
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn render(error: Error) -> (StatusCode, Option<String>, String) {
    let response = ResponseError::error_response(&error);
    let status = response.status();
    let trace_header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .map(|value| value.to_str().expect("Trace-Id is ASCII").to_owned());
    let content_type = response
        .headers()
        .get(actix_web::http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(content_type.starts_with("text/html"), "got {content_type}");
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let body = String::from_utf8(bytes.to_vec()).expect("body is UTF-8");
    (status, trace_header, body)
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(
    #[from(internal_error_case)] internal_error: Error,
    expected_trace_id: String,
) {
    let (status, trace_header, body) = render(internal_error).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(trace_header.as_deref(), Some(expected_trace_id.as_str()));
    assert!(!body.contains("postgres"));
    assert!(!body.contains("secret"));
    assert!(body.contains(&expected_trace_id));
}

#[rstest]
#[actix_web::test]
async fn client_errors_show_their_message() {
    let (status, trace_header, body) = render(Error::forbidden("nope")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(trace_header, None);
    assert!(body.contains("nope"));
    assert!(body.contains("Forbidden"));
}

#[rstest]
fn redaction_keeps_the_trace_id() {
    let error = Error::internal("boom").with_trace_id(TRACE_ID);
    let redacted = redact_if_internal(&error);
    assert_eq!(redacted.message(), "Internal server error");
    assert_eq!(redacted.trace_id(), Some(TRACE_ID));
    assert!(redacted.details().is_none());
}

#[rstest]
fn redaction_leaves_client_errors_alone() {
    let error = Error::invalid_request("bad").with_details(json!({"field": "title"}));
    assert_eq!(redact_if_internal(&error), error);
}

#[test]
fn from_actix_error_is_redacted_internal_error() {
    use actix_web::error;

    let actix_err = error::ErrorBadRequest("boom");
    let err: Error = actix_err.into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.trace_id(), None);
    assert_eq!(err.details(), None);
}
