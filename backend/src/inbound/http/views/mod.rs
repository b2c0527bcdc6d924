//! Server-rendered HTML for the screens.
//!
//! Markup is assembled with `format!` over small helpers. User supplied text
//! always passes through [`escape`]; post bodies arrive pre-sanitised as
//! [`crate::domain::RenderedHtml`].

mod auth;
mod error;
mod feed;
mod layout;
mod post;
mod time;

pub use auth::{LoginView, SignupView, login_page, signup_page, verify_page};
pub use error::error_page;
pub use feed::{FeedView, feed_fragment, feed_page};
pub use layout::Shell;
pub use post::{PostFormView, post_form_page, post_page};
pub use time::relative_time;

/// Escape text for use in element content or quoted attribute values.
pub(crate) fn escape(text: &str) -> String {
    ammonia::clean_text(text)
}

/// Inline error message for a form field.
pub(crate) fn field_error(message: Option<&str>) -> String {
    message.map_or_else(String::new, |message| {
        format!(r#"<p class="field-error" role="alert">{}</p>"#, escape(message))
    })
}
