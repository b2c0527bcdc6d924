//! Sign-in, sign-up and "check your email" pages.

use crate::domain::PASSWORD_MIN_CHARS;

use super::{escape, field_error};

/// Sign-in form state.
#[derive(Debug, Default)]
pub struct LoginView<'a> {
    /// Email as submitted.
    pub email: &'a str,
    /// Why the last attempt failed.
    pub error: Option<&'a str>,
}

/// Sign-in page.
#[must_use]
pub fn login_page(view: &LoginView<'_>) -> String {
    format!(
        r#"<section class="card auth-card">
<h1>Sign In</h1>
<p class="muted">Enter your email and password to sign in</p>
<form method="post" action="/auth/login" class="stacked">
<input name="email" type="email" placeholder="Email" required value="{email}">
<input name="password" type="password" placeholder="Password" required>
{error}<button type="submit" class="button">Sign In</button>
</form>
<p class="muted">No account yet? <a href="/auth/signup">Sign up</a></p>
</section>"#,
        email = escape(view.email),
        error = field_error(view.error),
    )
}

/// Sign-up form state.
#[derive(Debug, Default)]
pub struct SignupView<'a> {
    /// Email as submitted.
    pub email: &'a str,
    /// Password to prefill; only set right after generating one.
    pub generated_password: Option<&'a str>,
    /// Why the last attempt failed.
    pub error: Option<&'a str>,
}

/// Sign-up page. A generated password is shown in clear text so it can be
/// copied before submitting.
#[must_use]
pub fn signup_page(view: &SignupView<'_>) -> String {
    let (kind, value) = match view.generated_password {
        Some(password) => ("text", escape(password)),
        None => ("password", String::new()),
    };
    format!(
        r#"<section class="card auth-card">
<h1>Create an Account</h1>
<p class="muted">Enter your email and password to sign up</p>
<form method="post" action="/auth/signup" class="stacked">
<input name="email" type="email" placeholder="Email" required value="{email}">
<div class="password-row">
<input name="password" type="{kind}" placeholder="Password" value="{value}" minlength="{PASSWORD_MIN_CHARS}">
<button type="submit" name="intent" value="generate" class="button outline" formnovalidate>Generate</button>
</div>
<p class="muted">Password must be at least {PASSWORD_MIN_CHARS} characters with lowercase, uppercase, digits and symbols.</p>
{error}<button type="submit" name="intent" value="create" class="button">Create Account</button>
</form>
<p class="muted">Already registered? <a href="/auth/login">Sign in</a></p>
</section>"#,
        email = escape(view.email),
        error = field_error(view.error),
    )
}

/// Shown after a sign-up that needs email confirmation.
#[must_use]
pub fn verify_page() -> String {
    r#"<section class="card auth-card">
<h1>Check Your Email</h1>
<p class="muted">We sent you a verification link. Please check your email and click the link to verify your account.</p>
<a class="button" href="/auth/login">Return to Login</a>
</section>"#
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn generated_passwords_are_visible() {
        let html = signup_page(&SignupView {
            email: "ada@example.com",
            generated_password: Some("aB3!xyz9"),
            error: None,
        });
        assert!(html.contains(r#"type="text""#));
        assert!(html.contains(&escape("aB3!xyz9")));
    }

    #[rstest]
    fn typed_passwords_are_never_echoed() {
        let html = signup_page(&SignupView {
            email: "ada@example.com",
            generated_password: None,
            error: Some("Password is too weak"),
        });
        assert!(html.contains(r#"type="password" placeholder="Password" value="""#));
        assert!(html.contains(&escape("Password is too weak")));
    }

    #[rstest]
    fn login_keeps_the_email() {
        let html = login_page(&LoginView {
            email: "ada@example.com",
            error: Some("Invalid email or password"),
        });
        assert!(html.contains(&escape("ada@example.com")));
        assert!(html.contains(&escape("Invalid email or password")));
    }
}
