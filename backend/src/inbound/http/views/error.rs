//! Standalone error page used by the HTTP error mapping.

use actix_web::http::StatusCode;

use crate::domain::{Error, Identity};

use super::{Shell, escape};

/// Full page describing `error`. The message must already be safe to show.
#[must_use]
pub fn error_page(status: StatusCode, error: &Error) -> String {
    let heading = status.canonical_reason().unwrap_or("Error");
    let reference = error.trace_id().map_or_else(String::new, |id| {
        format!(r#"<p class="muted">Reference: <code>{}</code></p>"#, escape(id))
    });
    let main = format!(
        r#"<section class="card">
<h1>{heading}</h1>
<p>{message}</p>
{reference}
<a class="button" href="/">Back to the feed</a>
</section>"#,
        message = escape(error.message()),
    );
    Shell {
        title: heading,
        identity: &Identity::Guest,
        flash: None,
    }
    .render(&main)
}
