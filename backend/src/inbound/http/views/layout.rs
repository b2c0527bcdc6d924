//! Page shell: document head, navbar and flash banner.

use crate::domain::Identity;
use crate::inbound::http::session::Flash;

use super::escape;

const STYLESHEET: &str = include_str!("../../../../static/app.css");

/// Chrome shared by every full page.
pub struct Shell<'a> {
    /// Document title, before the site name.
    pub title: &'a str,
    /// Caller, for the navbar.
    pub identity: &'a Identity,
    /// Pending notification.
    pub flash: Option<&'a Flash>,
}

impl Shell<'_> {
    /// Wrap `main` in the full document.
    #[must_use]
    pub fn render(&self, main: &str) -> String {
        let title = escape(self.title);
        let nav = navbar(self.identity);
        let flash = self.flash.map_or_else(String::new, banner);
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Fictures</title>
<style>{STYLESHEET}</style>
</head>
<body>
{nav}
<main class="container">
{flash}{main}
</main>
</body>
</html>"#
        )
    }
}

fn navbar(identity: &Identity) -> String {
    let account = match identity {
        Identity::Authenticated(_) => {
            let email = identity.email().map(|email| escape(email.as_str())).unwrap_or_default();
            format!(
                r#"<span class="muted">{email}</span>
<form method="post" action="/auth/logout" class="inline"><button type="submit" class="button outline">Sign Out</button></form>"#
            )
        }
        Identity::Guest | Identity::Anonymous(_) => r#"<a class="button ghost" href="/auth/login">Sign In</a>
<a class="button" href="/auth/signup">Sign Up</a>"#
            .to_owned(),
    };
    format!(
        r#"<nav class="navbar"><div class="container nav-inner">
<a class="brand" href="/">Fictures</a>
<div class="nav-actions">{account}</div>
</div></nav>"#
    )
}

fn banner(flash: &Flash) -> String {
    format!(
        r#"<div class="flash flash-{}" role="status">{}</div>
"#,
        flash.level().as_str(),
        escape(flash.message())
    )
}
