//! Sign-in, sign-up, verification and sign-out screens.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, get, post, web};
use tracing::warn;

use super::forms::{LoginForm, SignupForm, SignupIntent};
use super::renewal::with_live_session;
use super::respond::{failure_flash, page, redirect_with};
use super::session::{Flash, SessionContext};
use super::state::HttpState;
use super::views::{LoginView, SignupView, login_page, signup_page, verify_page};
use crate::domain::{Credentials, ErrorCode, SignUpOutcome, generate_password};

fn login_response(
    status: StatusCode,
    session: &SessionContext,
    flash: Option<&Flash>,
    view: &LoginView<'_>,
) -> HttpResponse {
    page(status, "Sign In", &session.identity(), flash, &login_page(view))
}

fn signup_response(
    status: StatusCode,
    session: &SessionContext,
    flash: Option<&Flash>,
    view: &SignupView<'_>,
) -> HttpResponse {
    page(status, "Sign Up", &session.identity(), flash, &signup_page(view))
}

/// Sign-in form.
#[get("/auth/login")]
pub async fn login_form(session: SessionContext) -> HttpResponse {
    let flash = session.take_flash();
    login_response(StatusCode::OK, &session, flash.as_ref(), &LoginView::default())
}

/// Exchange email and password for a hosted session.
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<LoginForm>,
) -> HttpResponse {
    let form = form.into_inner();
    let rejected = |message: &str| {
        login_response(
            StatusCode::BAD_REQUEST,
            &session,
            None,
            &LoginView {
                email: &form.email,
                error: Some(message),
            },
        )
    };
    let credentials = match Credentials::for_sign_in(&form.email, &form.password) {
        Ok(credentials) => credentials,
        Err(err) => return rejected(&err.to_string()),
    };
    match state.identity.sign_in(&credentials).await {
        Ok(auth) => match session.persist_session(&auth) {
            Ok(()) => redirect_with(&session, "/", Flash::success("Signed in successfully")),
            Err(err) => {
                let flash = failure_flash(&err, "Failed to sign in. Please try again.");
                login_response(StatusCode::OK, &session, Some(&flash), &LoginView::default())
            }
        },
        Err(err) if matches!(err.code(), ErrorCode::Unauthorized | ErrorCode::InvalidRequest) => {
            warn!(message = %err.message(), "sign-in rejected");
            rejected(err.message())
        }
        Err(err) => {
            let flash = failure_flash(&err, "Failed to sign in. Please try again.");
            login_response(
                StatusCode::OK,
                &session,
                Some(&flash),
                &LoginView {
                    email: &form.email,
                    error: None,
                },
            )
        }
    }
}

/// Sign-up form.
#[get("/auth/signup")]
pub async fn signup_form(session: SessionContext) -> HttpResponse {
    let flash = session.take_flash();
    signup_response(StatusCode::OK, &session, flash.as_ref(), &SignupView::default())
}

/// Register, or fill the form with a generated password.
///
/// Signing up from an anonymous session upgrades that user in place, so
/// posts written anonymously stay editable.
#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<SignupForm>,
) -> HttpResponse {
    let form = form.into_inner();
    if form.intent == SignupIntent::Generate {
        let password = generate_password();
        let flash = Flash::success("Password generated successfully!");
        return signup_response(
            StatusCode::OK,
            &session,
            Some(&flash),
            &SignupView {
                email: &form.email,
                generated_password: Some(password.as_str()),
                error: None,
            },
        );
    }
    let rejected = |message: &str| {
        signup_response(
            StatusCode::BAD_REQUEST,
            &session,
            None,
            &SignupView {
                email: &form.email,
                generated_password: None,
                error: Some(message),
            },
        )
    };
    let credentials = match Credentials::for_sign_up(&form.email, &form.password) {
        Ok(credentials) => credentials,
        Err(err) => return rejected(&err.to_string()),
    };
    let resolver = &state.identity;
    let credentials = &credentials;
    let outcome = with_live_session(&state, &session, move |identity| async move {
        resolver.sign_up(&identity, credentials).await
    })
    .await;
    match outcome {
        Ok(SignUpOutcome::SessionIssued(auth)) => match session.persist_session(&auth) {
            Ok(()) => redirect_with(&session, "/", Flash::success("Account created successfully")),
            Err(err) => redirect_with(
                &session,
                "/auth/login",
                failure_flash(&err, "Account created, please sign in"),
            ),
        },
        Ok(SignUpOutcome::VerificationPending { .. }) => redirect_with(
            &session,
            "/auth/verify",
            Flash::success("Please check your email for verification."),
        ),
        Err(err) if matches!(err.code(), ErrorCode::Conflict | ErrorCode::InvalidRequest) => {
            rejected(err.message())
        }
        Err(err) => {
            let flash = failure_flash(&err, "Failed to sign up. Please try again.");
            signup_response(
                StatusCode::OK,
                &session,
                Some(&flash),
                &SignupView {
                    email: &form.email,
                    generated_password: None,
                    error: None,
                },
            )
        }
    }
}

/// "Check your email" screen.
#[get("/auth/verify")]
pub async fn verify(session: SessionContext) -> HttpResponse {
    let flash = session.take_flash();
    page(
        StatusCode::OK,
        "Check Your Email",
        &session.identity(),
        flash.as_ref(),
        &verify_page(),
    )
}

/// Revoke the hosted session (best effort) and forget it locally.
#[post("/auth/logout")]
pub async fn logout(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    let identity = session.identity();
    state.identity.sign_out(&identity).await;
    session.clear_identity();
    redirect_with(&session, "/", Flash::success("You have been logged out successfully."))
}
