//! Response helpers shared by the screen handlers.

use actix_web::http::StatusCode;
use actix_web::http::header::{self, ContentType};
use actix_web::HttpResponse;
use tracing::{error, warn};

use super::session::{Flash, SessionContext};
use super::views::Shell;
use crate::domain::{Error, ErrorCode, Identity};

/// Full HTML page with `status`, showing `flash` in the banner.
pub(crate) fn page(
    status: StatusCode,
    title: &str,
    identity: &Identity,
    flash: Option<&Flash>,
    main: &str,
) -> HttpResponse {
    let html = Shell {
        title,
        identity,
        flash,
    }
    .render(main);
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(html)
}

/// `303 See Other` to `location`.
pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_owned()))
        .finish()
}

/// Queue `flash` and redirect. A flash that cannot be stored is logged and
/// dropped; the redirect still happens.
pub(crate) fn redirect_with(session: &SessionContext, location: &str, flash: Flash) -> HttpResponse {
    if let Err(err) = session.set_flash(flash) {
        warn!(error = %err, "flash message dropped");
    }
    redirect(location)
}

/// Log a failed screen action and pick the notification for it.
///
/// Client-facing categories keep their message; transport and internal
/// failures fall back to `generic`.
pub(crate) fn failure_flash(err: &Error, generic: &str) -> Flash {
    match err.code() {
        ErrorCode::InternalError | ErrorCode::ServiceUnavailable => {
            error!(code = %err.code(), message = %err.message(), "screen action failed");
            Flash::error(generic)
        }
        _ => {
            warn!(code = %err.code(), message = %err.message(), "screen action rejected");
            Flash::error(err.message())
        }
    }
}

/// Answer an unauthorized write: drop any stale hosted token and send the
/// caller to sign in with the reason.
pub(crate) fn require_sign_in(session: &SessionContext, err: &Error) -> HttpResponse {
    warn!(message = %err.message(), "write needs a fresh session");
    session.clear_identity();
    redirect_with(session, "/auth/login", Flash::error(err.message()))
}
