//! Feed screen (`/`) and the infinite-scroll fragment endpoint (`/feed`).

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, get, web};
use pagination::{PageCursor, PageRequest};
use serde::Deserialize;

use super::ApiResult;
use super::respond::{failure_flash, page};
use super::session::SessionContext;
use super::state::HttpState;
use super::views::{FeedView, feed_fragment, feed_page};
use crate::domain::{Error, FEED_PAGE_SIZE};

/// Query string shared by both feed endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    cursor: Option<String>,
}

impl FeedQuery {
    /// Page named by the cursor, or the first page. The page size is pinned
    /// server side whatever the cursor says.
    fn page_request(&self) -> Result<PageRequest, Error> {
        let page = match self.cursor.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(raw) => raw
                .parse::<PageCursor>()
                .and_then(|cursor| cursor.decode())
                .map_err(|err| Error::invalid_request(err.to_string()))?
                .page(),
        };
        PageRequest::new(page, FEED_PAGE_SIZE).map_err(|err| Error::internal(err.to_string()))
    }
}

/// Feed page. Load failures render an empty feed with an error banner.
#[get("/")]
pub async fn index(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<FeedQuery>,
) -> ApiResult<HttpResponse> {
    let identity = session.identity();
    let request = query.page_request()?;
    let (posts, next, flash) = match state.feed.page(request).await {
        Ok(window) => (window.items().to_vec(), window.next_cursor(), session.take_flash()),
        Err(err) => (Vec::new(), None, Some(failure_flash(&err, "Failed to load posts"))),
    };
    let main = feed_page(&FeedView {
        posts: &posts,
        next: next.as_ref(),
        identity: &identity,
        renderer: &state.renderer,
        now: state.clock.utc(),
    });
    Ok(page(StatusCode::OK, "Feed", &identity, flash.as_ref(), &main))
}

/// Cards for the window named by `cursor`, followed by the next sentinel.
#[get("/feed")]
pub async fn feed_window(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<FeedQuery>,
) -> ApiResult<HttpResponse> {
    let identity = session.identity();
    let window = state.feed.page(query.page_request()?).await?;
    let next = window.next_cursor();
    let html = feed_fragment(&FeedView {
        posts: window.items(),
        next: next.as_ref(),
        identity: &identity,
        renderer: &state.renderer,
        now: state.clock.utc(),
    });
    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(html))
}
