//! Post detail page and the create/edit form.

use chrono::{DateTime, Utc};

use crate::domain::{CONTENT_MAX_CHARS, Identity, Post, RenderedHtml, TITLE_MAX_CHARS};

use super::{escape, field_error, relative_time};

/// Detail view of a single post; controls appear only for its author.
#[must_use]
pub fn post_page(post: &Post, body: &RenderedHtml, identity: &Identity, now: DateTime<Utc>) -> String {
    let id = post.id();
    let controls = if identity.owns(post) {
        format!(
            r#"<a class="button outline" href="/post/{id}/edit">Edit</a>
<form method="post" action="/post/{id}/delete" class="inline" onsubmit="return confirm('Delete this post?');"><button type="submit" class="button danger">Delete</button></form>"#
        )
    } else {
        String::new()
    };
    format!(
        r#"<div class="page-header">
<a class="button ghost" href="/">Back</a>
<div class="actions">{controls}</div>
</div>
<article class="card">
<h1>{title}</h1>
<p class="muted">{author} <time datetime="{stamp}">{age}</time></p>
<div class="prose">{body}</div>
</article>"#,
        title = escape(post.title()),
        author = escape(&post.user_id().author_label()),
        stamp = post.created_at().to_rfc3339(),
        age = relative_time(post.created_at(), now),
        body = body.as_str(),
    )
}

/// Values and messages for the post form. Heading, labels and links are
/// trusted markup; only the field values are escaped.
#[derive(Debug, Default)]
pub struct PostFormView<'a> {
    /// Page heading.
    pub heading: &'a str,
    /// Form target.
    pub action: &'a str,
    /// Submit button label.
    pub submit_label: &'a str,
    /// Where "Cancel" leads.
    pub cancel_href: &'a str,
    /// Title as submitted or stored.
    pub title: &'a str,
    /// Content as submitted or stored.
    pub content: &'a str,
    /// Problem with the title.
    pub title_error: Option<&'a str>,
    /// Problem with the content.
    pub content_error: Option<&'a str>,
}

/// Create or edit form. Length limits are mirrored in the markup so browsers
/// stop over-long input before it is sent.
#[must_use]
pub fn post_form_page(view: &PostFormView<'_>) -> String {
    format!(
        r#"<h1>{heading}</h1>
<form method="post" action="{action}" class="stacked">
<label for="title">Title</label>
<input id="title" name="title" type="text" maxlength="{TITLE_MAX_CHARS}" required value="{title}">
{title_error}<label for="content">Content (markdown)</label>
<textarea id="content" name="content" maxlength="{CONTENT_MAX_CHARS}" required>{content}</textarea>
{content_error}<div class="actions">
<button type="submit" class="button">{submit}</button>
<a class="button outline" href="{cancel}">Cancel</a>
</div>
</form>"#,
        heading = view.heading,
        action = view.action,
        title = escape(view.title),
        title_error = field_error(view.title_error),
        content = escape(view.content),
        content_error = field_error(view.content_error),
        submit = view.submit_label,
        cancel = view.cancel_href,
    )
}
