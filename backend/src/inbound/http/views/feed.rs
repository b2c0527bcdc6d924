//! Feed screen and the fragments appended by infinite scroll.

use chrono::{DateTime, Utc};
use pagination::PageCursor;

use crate::domain::{Identity, MarkdownRenderer, Post};

use super::{escape, relative_time};

const FEED_SCRIPT: &str = include_str!("../../../../static/feed.js");

/// Everything a feed window needs to render.
pub struct FeedView<'a> {
    /// Posts in this window, newest first.
    pub posts: &'a [Post],
    /// Cursor for the following window, absent once exhausted.
    pub next: Option<&'a PageCursor>,
    /// Caller, for edit links.
    pub identity: &'a Identity,
    /// Renderer for post excerpts.
    pub renderer: &'a MarkdownRenderer,
    /// Reference point for relative timestamps.
    pub now: DateTime<Utc>,
}

/// Main column of `/`.
///
/// Every card carries `data-post-id`; the scroll script drops incoming cards
/// whose id is already on the page, since offset windows shift when posts
/// are created between loads.
#[must_use]
pub fn feed_page(view: &FeedView<'_>) -> String {
    let items = if view.posts.is_empty() && view.next.is_none() {
        r#"<p class="feed-empty">No posts yet. Be the first to write something!</p>"#.to_owned()
    } else {
        feed_fragment(view)
    };
    format!(
        r#"<header class="page-header">
<h1>Latest posts</h1>
<a class="button" href="/create">Write a post</a>
</header>
<section id="feed">
{items}</section>
<script>{FEED_SCRIPT}</script>"#
    )
}

/// Cards for one window followed by the next sentinel or the end marker.
#[must_use]
pub fn feed_fragment(view: &FeedView<'_>) -> String {
    let mut html = String::new();
    for post in view.posts {
        html.push_str(&post_card(post, view));
    }
    match view.next {
        Some(cursor) => html.push_str(&format!(
            r#"<div class="feed-sentinel" data-next="/feed?cursor={cursor}"><a href="/?cursor={cursor}">Load more</a></div>
"#
        )),
        None => html.push_str(
            r#"<p class="feed-end">You have reached the end.</p>
"#,
        ),
    }
    html
}

fn post_card(post: &Post, view: &FeedView<'_>) -> String {
    let id = post.id();
    let edit = if view.identity.owns(post) {
        format!(r#" <a class="button ghost" href="/post/{id}/edit">Edit</a>"#)
    } else {
        String::new()
    };
    format!(
        r#"<article class="card" data-post-id="{id}">
<div class="card-meta"><span class="muted">{author}{edit}</span><time class="muted" datetime="{stamp}">{age}</time></div>
<h2><a href="/post/{id}">{title}</a></h2>
<div class="prose excerpt">{excerpt}</div>
</article>
"#,
        author = escape(&post.user_id().author_label()),
        stamp = post.created_at().to_rfc3339(),
        age = relative_time(post.created_at(), view.now),
        title = escape(post.title()),
        excerpt = view.renderer.render(post.content()).as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccessToken, AuthSession, PostId, UserId};
    use chrono::TimeZone;
    use pagination::PageRequest;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().expect("timestamp")
    }

    fn post(id: &str, author: &str, now: DateTime<Utc>) -> Post {
        Post::new(
            PostId::new(id).expect("post id"),
            "Hello <world>",
            "**bold** <script>alert(1)</script>",
            UserId::new(author).expect("user id"),
            now - chrono::Duration::minutes(5),
        )
    }

    fn owner() -> Identity {
        Identity::Anonymous(AuthSession::anonymous(
            UserId::new("abcdef123456").expect("user id"),
            AccessToken::new("jwt"),
        ))
    }

    #[rstest]
    fn cards_are_escaped_and_sanitised(now: DateTime<Utc>) {
        let posts = [post("p1", "abcdef123456", now)];
        let renderer = MarkdownRenderer::new();
        let html = feed_fragment(&FeedView {
            posts: &posts,
            next: None,
            identity: &Identity::Guest,
            renderer: &renderer,
            now,
        });
        assert!(html.contains(&escape("Hello <world>")));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("5 minutes ago"));
        assert!(html.contains(&escape("Anonymous #abcdef12")));
        assert!(html.contains("feed-end"));
    }

    #[rstest]
    fn owners_get_edit_links(now: DateTime<Utc>) {
        let posts = [post("p1", "abcdef123456", now), post("p2", "someone", now)];
        let renderer = MarkdownRenderer::new();
        let identity = owner();
        let html = feed_fragment(&FeedView {
            posts: &posts,
            next: None,
            identity: &identity,
            renderer: &renderer,
            now,
        });
        assert!(html.contains(r#"href="/post/p1/edit""#));
        assert!(!html.contains(r#"href="/post/p2/edit""#));
    }

    #[rstest]
    fn sentinel_carries_the_next_cursor(now: DateTime<Utc>) {
        let cursor = PageRequest::new(1, 10).expect("page").cursor();
        let renderer = MarkdownRenderer::new();
        let html = feed_fragment(&FeedView {
            posts: &[],
            next: Some(&cursor),
            identity: &Identity::Guest,
            renderer: &renderer,
            now,
        });
        assert!(html.contains(&format!(r#"data-next="/feed?cursor={cursor}""#)));
        assert!(!html.contains("feed-end"));
    }

    #[rstest]
    fn cards_are_keyed_by_post_id(now: DateTime<Utc>) {
        let posts = [post("p1", "abcdef123456", now), post("p2", "someone", now)];
        let renderer = MarkdownRenderer::new();
        let html = feed_fragment(&FeedView {
            posts: &posts,
            next: None,
            identity: &Identity::Guest,
            renderer: &renderer,
            now,
        });
        assert_eq!(html.matches(r#"data-post-id="p1""#).count(), 1);
        assert_eq!(html.matches(r#"data-post-id="p2""#).count(), 1);
    }

    #[rstest]
    fn scroll_script_skips_cards_already_on_the_page(now: DateTime<Utc>) {
        let renderer = MarkdownRenderer::new();
        let html = feed_page(&FeedView {
            posts: &[post("p1", "abcdef123456", now)],
            next: None,
            identity: &Identity::Guest,
            renderer: &renderer,
            now,
        });
        assert!(html.contains("article[data-post-id]"));
        assert!(html.contains("knownIds"));
    }

    #[rstest]
    fn empty_feed_invites_a_first_post(now: DateTime<Utc>) {
        let renderer = MarkdownRenderer::new();
        let html = feed_page(&FeedView {
            posts: &[],
            next: None,
            identity: &Identity::Guest,
            renderer: &renderer,
            now,
        });
        assert!(html.contains("Be the first to write something"));
        assert!(html.contains(r#"href="/create""#));
    }
}
