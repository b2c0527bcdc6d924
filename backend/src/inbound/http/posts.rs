//! Post screens: create, view, edit and delete.
//!
//! Writes are gated twice: the screens only offer controls to the author,
//! and the store filters every update and delete by author id, so a forged
//! request still changes nothing.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, get, post, web};
use tracing::warn;

use super::forms::{PostForm, PostFormErrors};
use super::ApiResult;
use super::renewal::with_live_session;
use super::respond::{failure_flash, page, redirect_with, require_sign_in};
use super::session::{Flash, SessionContext};
use super::state::HttpState;
use super::views::{PostFormView, post_form_page, post_page};
use crate::domain::{EditAccess, Error, ErrorCode, Identity, PostId};

fn parse_id(raw: &str) -> Option<PostId> {
    PostId::new(raw).ok()
}

fn post_not_found(session: &SessionContext) -> HttpResponse {
    redirect_with(session, "/", Flash::error("Post not found"))
}

/// Redirect home for a post that could not be loaded.
fn unavailable_post(session: &SessionContext, err: &Error) -> HttpResponse {
    if err.code() == ErrorCode::NotFound {
        return post_not_found(session);
    }
    redirect_with(session, "/", failure_flash(err, "Failed to load post"))
}

struct FormScreen<'a> {
    title: &'a str,
    heading: &'a str,
    action: &'a str,
    submit_label: &'a str,
    cancel_href: &'a str,
}

const CREATE_SCREEN: FormScreen<'static> = FormScreen {
    title: "Create Post",
    heading: "Create a New Post",
    action: "/create",
    submit_label: "Create Post",
    cancel_href: "/",
};

fn form_response(
    status: StatusCode,
    screen: &FormScreen<'_>,
    identity: &Identity,
    flash: Option<&Flash>,
    form: &PostForm,
    errors: &PostFormErrors,
) -> HttpResponse {
    let main = post_form_page(&PostFormView {
        heading: screen.heading,
        action: screen.action,
        submit_label: screen.submit_label,
        cancel_href: screen.cancel_href,
        title: &form.title,
        content: &form.content,
        title_error: errors.title.as_deref(),
        content_error: errors.content.as_deref(),
    });
    page(status, screen.title, identity, flash, &main)
}

/// Empty post form.
#[get("/create")]
pub async fn create_form(session: SessionContext) -> HttpResponse {
    let identity = session.identity();
    let flash = session.take_flash();
    form_response(
        StatusCode::OK,
        &CREATE_SCREEN,
        &identity,
        flash.as_ref(),
        &PostForm::default(),
        &PostFormErrors::default(),
    )
}

/// Validate, resolve an author (signing a guest in anonymously) and insert.
#[post("/create")]
pub async fn create_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<PostForm>,
) -> HttpResponse {
    let identity = session.identity();
    let draft = match form.to_draft() {
        Ok(draft) => draft,
        Err(errors) => {
            return form_response(
                StatusCode::BAD_REQUEST,
                &CREATE_SCREEN,
                &identity,
                None,
                &form,
                &errors,
            );
        }
    };
    let (posts, draft) = (&state.posts, &draft);
    let created = with_live_session(&state, &session, move |identity| async move {
        posts.create(&identity, draft).await
    })
    .await;
    match created {
        Ok(created) => {
            let persisted = created
                .issued
                .as_ref()
                .map_or(Ok(()), |issued| session.persist_session(issued));
            if let Err(err) = persisted {
                warn!(error = %err, "anonymous session not persisted");
            }
            redirect_with(&session, "/", Flash::success("Post created successfully"))
        }
        Err(err) if err.code() == ErrorCode::Unauthorized => require_sign_in(&session, &err),
        Err(err) => {
            let flash = failure_flash(&err, "Failed to create post");
            form_response(
                StatusCode::OK,
                &CREATE_SCREEN,
                &identity,
                Some(&flash),
                &form,
                &PostFormErrors::default(),
            )
        }
    }
}

/// Post detail. Unknown ids redirect home.
#[get("/post/{id}")]
pub async fn show_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> HttpResponse {
    let Some(id) = parse_id(&path) else {
        return post_not_found(&session);
    };
    let post = match state.posts.get(&id).await {
        Ok(post) => post,
        Err(err) => return unavailable_post(&session, &err),
    };
    let identity = session.identity();
    let flash = session.take_flash();
    let body = state.renderer.render(post.content());
    let main = post_page(&post, &body, &identity, state.clock.utc());
    page(StatusCode::OK, post.title(), &identity, flash.as_ref(), &main)
}

fn edit_screen(id: &PostId) -> (String, String) {
    (format!("/post/{id}/edit"), format!("/post/{id}"))
}

/// Edit form for the author; everyone else is sent to the post.
#[get("/post/{id}/edit")]
pub async fn edit_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> HttpResponse {
    let Some(id) = parse_id(&path) else {
        return post_not_found(&session);
    };
    let identity = session.identity();
    let post = match state.posts.edit_access(&identity, &id).await {
        Ok(EditAccess::Owner(post)) => post,
        Ok(EditAccess::NotOwner(_)) => {
            return redirect_with(
                &session,
                &format!("/post/{id}"),
                Flash::error("You can only edit your own posts"),
            );
        }
        Err(err) => return unavailable_post(&session, &err),
    };
    let flash = session.take_flash();
    let (action, cancel) = edit_screen(&id);
    let form = PostForm {
        title: post.title().to_owned(),
        content: post.content().to_owned(),
    };
    form_response(
        StatusCode::OK,
        &FormScreen {
            title: "Edit Post",
            heading: "Edit Post",
            action: &action,
            submit_label: "Update Post",
            cancel_href: &cancel,
        },
        &identity,
        flash.as_ref(),
        &form,
        &PostFormErrors::default(),
    )
}

/// Apply an edit; the store only touches the row if the caller wrote it.
#[post("/post/{id}/edit")]
pub async fn update_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    form: web::Form<PostForm>,
) -> HttpResponse {
    let Some(id) = parse_id(&path) else {
        return post_not_found(&session);
    };
    let identity = session.identity();
    let (action, cancel) = edit_screen(&id);
    let screen = FormScreen {
        title: "Edit Post",
        heading: "Edit Post",
        action: &action,
        submit_label: "Update Post",
        cancel_href: &cancel,
    };
    let draft = match form.to_draft() {
        Ok(draft) => draft,
        Err(errors) => {
            return form_response(StatusCode::BAD_REQUEST, &screen, &identity, None, &form, &errors);
        }
    };
    let (posts, target, draft) = (&state.posts, &id, &draft);
    let updated = with_live_session(&state, &session, move |identity| async move {
        posts.update(&identity, target, draft).await
    })
    .await;
    match updated {
        Ok(()) => redirect_with(&session, &cancel, Flash::success("Post updated successfully")),
        Err(err) if err.code() == ErrorCode::Unauthorized => require_sign_in(&session, &err),
        Err(err) if err.code() == ErrorCode::Forbidden => {
            redirect_with(&session, &cancel, failure_flash(&err, "Failed to update post"))
        }
        Err(err) => {
            let flash = failure_flash(&err, "Failed to update post");
            form_response(
                StatusCode::OK,
                &screen,
                &identity,
                Some(&flash),
                &form,
                &PostFormErrors::default(),
            )
        }
    }
}

/// Delete a post the caller wrote.
#[post("/post/{id}/delete")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> HttpResponse {
    let Some(id) = parse_id(&path) else {
        return post_not_found(&session);
    };
    let (posts, target) = (&state.posts, &id);
    let deleted = with_live_session(&state, &session, move |identity| async move {
        posts.delete(&identity, target).await
    })
    .await;
    match deleted {
        Ok(()) => redirect_with(&session, "/", Flash::success("Post deleted successfully")),
        Err(err) if err.code() == ErrorCode::Unauthorized => require_sign_in(&session, &err),
        Err(err) => redirect_with(
            &session,
            &format!("/post/{id}"),
            failure_flash(&err, "Failed to delete post"),
        ),
    }
}

/// Fallback for unknown paths.
pub async fn not_found() -> ApiResult<HttpResponse> {
    Err(Error::not_found("Page not found"))
}
