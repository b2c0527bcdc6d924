//! Shared helpers for turning hosted HTTP failures into port errors.

use reqwest::StatusCode;

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Whitespace-collapsed, length-capped view of a response body for logs.
pub(super) fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

/// `status <code>` followed by the body preview when there is one.
pub(super) fn status_message(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}

/// Transport failures, with timeouts called out.
pub(super) fn transport_message(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {error}")
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"", "")]
    #[case(b"  {\"message\":\n  \"bad\"}  ", "{\"message\": \"bad\"}")]
    fn previews_collapse_whitespace(#[case] body: &[u8], #[case] expected: &str) {
        assert_eq!(body_preview(body), expected);
    }

    #[rstest]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(PREVIEW_CHAR_LIMIT + 10);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), PREVIEW_CHAR_LIMIT + 3);
        assert!(preview.ends_with("..."));
    }

    #[rstest]
    #[case(StatusCode::BAD_GATEWAY, b"", "status 502")]
    #[case(StatusCode::BAD_REQUEST, b"oops", "status 400: oops")]
    fn status_messages_include_code(
        #[case] status: StatusCode,
        #[case] body: &[u8],
        #[case] expected: &str,
    ) {
        assert_eq!(status_message(status, body), expected);
    }
}
