//! Post model and draft validation.
//!
//! Stored posts are read back exactly as the store returns them; only drafts
//! (what a user submits) are validated, so a row written by an older client
//! with looser limits still renders.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 100;
/// Maximum content length in characters.
pub const CONTENT_MAX_CHARS: usize = 2000;

/// Validation errors for post identifiers and drafts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    /// Post ids must not be empty.
    #[error("post id must not be empty")]
    EmptyId,
    /// Post ids are limited to URL-safe characters.
    #[error("post id may only contain letters, digits, '-' or '_'")]
    InvalidId,
    /// Title was blank once trimmed.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Title exceeded [`TITLE_MAX_CHARS`].
    #[error("title must be at most {max} characters")]
    TitleTooLong {
        /// Character limit.
        max: usize,
    },
    /// Content was blank once trimmed.
    #[error("content must not be empty")]
    EmptyContent,
    /// Content exceeded [`CONTENT_MAX_CHARS`].
    #[error("content must be at most {max} characters")]
    ContentTooLong {
        /// Character limit.
        max: usize,
    },
}

impl PostValidationError {
    /// Name of the form field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::InvalidId => "id",
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::EmptyContent | Self::ContentTooLong { .. } => "content",
        }
    }
}

/// Store-assigned post identifier.
///
/// Hosted tables hand out UUIDs or integers; both fit the URL-safe alphabet
/// enforced here, so ids can be placed in paths without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostId(String);

impl PostId {
    /// Validate and construct a [`PostId`].
    ///
    /// # Errors
    /// Rejects empty ids and ids outside `[A-Za-z0-9_-]`.
    pub fn new(id: impl Into<String>) -> Result<Self, PostValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(PostValidationError::EmptyId);
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(PostValidationError::InvalidId);
        }
        Ok(Self(id))
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PostId> for String {
    fn from(value: PostId) -> Self {
        value.0
    }
}

impl TryFrom<String> for PostId {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Trimmed, non-empty title of at most [`TITLE_MAX_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTitle(String);

impl PostTitle {
    /// Trim and validate a submitted title.
    ///
    /// # Errors
    /// Returns [`PostValidationError::EmptyTitle`] or
    /// [`PostValidationError::TitleTooLong`].
    pub fn new(raw: &str) -> Result<Self, PostValidationError> {
        let title = raw.trim();
        if title.is_empty() {
            return Err(PostValidationError::EmptyTitle);
        }
        if title.chars().count() > TITLE_MAX_CHARS {
            return Err(PostValidationError::TitleTooLong {
                max: TITLE_MAX_CHARS,
            });
        }
        Ok(Self(title.to_owned()))
    }

    /// Borrow the title text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Trimmed, non-empty markdown body of at most [`CONTENT_MAX_CHARS`]
/// characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent(String);

impl PostContent {
    /// Trim and validate submitted content.
    ///
    /// # Errors
    /// Returns [`PostValidationError::EmptyContent`] or
    /// [`PostValidationError::ContentTooLong`].
    pub fn new(raw: &str) -> Result<Self, PostValidationError> {
        let content = raw.trim();
        if content.is_empty() {
            return Err(PostValidationError::EmptyContent);
        }
        if content.chars().count() > CONTENT_MAX_CHARS {
            return Err(PostValidationError::ContentTooLong {
                max: CONTENT_MAX_CHARS,
            });
        }
        Ok(Self(content.to_owned()))
    }

    /// Borrow the markdown text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated title and content, ready to be inserted or applied as an edit.
///
/// # Examples
/// ```
/// use fictures::domain::{PostDraft, PostValidationError};
///
/// let draft = PostDraft::try_from_parts("  Hello ", "World").expect("valid draft");
/// assert_eq!(draft.title().as_str(), "Hello");
///
/// let too_long = "x".repeat(101);
/// assert!(matches!(
///     PostDraft::try_from_parts(&too_long, "body"),
///     Err(PostValidationError::TitleTooLong { max: 100 })
/// ));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    title: PostTitle,
    content: PostContent,
}

impl PostDraft {
    /// Build a draft from validated parts.
    #[must_use]
    pub const fn new(title: PostTitle, content: PostContent) -> Self {
        Self { title, content }
    }

    /// Validate raw form input. The title is checked first.
    ///
    /// # Errors
    /// Returns the first [`PostValidationError`] encountered.
    pub fn try_from_parts(title: &str, content: &str) -> Result<Self, PostValidationError> {
        Ok(Self::new(PostTitle::new(title)?, PostContent::new(content)?))
    }

    /// Draft title.
    #[must_use]
    pub const fn title(&self) -> &PostTitle {
        &self.title
    }

    /// Draft content.
    #[must_use]
    pub const fn content(&self) -> &PostContent {
        &self.content
    }
}

/// A stored post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    id: PostId,
    title: String,
    content: String,
    user_id: UserId,
    created_at: DateTime<Utc>,
}

impl Post {
    /// Assemble a post from stored fields.
    #[must_use]
    pub fn new(
        id: PostId,
        title: impl Into<String>,
        content: impl Into<String>,
        user_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            user_id,
            created_at,
        }
    }

    /// Store-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> &PostId {
        &self.id
    }

    /// Title as stored.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Markdown body as stored.
    #[must_use]
    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    /// Author reference.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Copy of this post with the draft's title and content applied.
    #[must_use]
    pub fn with_draft(&self, draft: &PostDraft) -> Self {
        Self {
            title: draft.title().as_str().to_owned(),
            content: draft.content().as_str().to_owned(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", PostValidationError::EmptyId)]
    #[case("a/b", PostValidationError::InvalidId)]
    #[case("1 2", PostValidationError::InvalidId)]
    fn rejects_unsafe_post_ids(#[case] raw: &str, #[case] expected: PostValidationError) {
        assert_eq!(PostId::new(raw), Err(expected));
    }

    #[rstest]
    #[case("42")]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    fn accepts_store_ids(#[case] raw: &str) {
        assert_eq!(PostId::new(raw).map(|id| id.to_string()), Ok(raw.to_owned()));
    }

    #[rstest]
    #[case::blank_title("   ", "body", PostValidationError::EmptyTitle)]
    #[case::blank_content("title", "\n\t", PostValidationError::EmptyContent)]
    #[case::long_title(&"t".repeat(101), "body", PostValidationError::TitleTooLong { max: 100 })]
    #[case::long_content("title", &"c".repeat(2001), PostValidationError::ContentTooLong { max: 2000 })]
    fn rejects_invalid_drafts(
        #[case] title: &str,
        #[case] content: &str,
        #[case] expected: PostValidationError,
    ) {
        assert_eq!(PostDraft::try_from_parts(title, content), Err(expected));
    }

    #[rstest]
    fn limits_are_inclusive_and_count_characters() {
        let title = "é".repeat(TITLE_MAX_CHARS);
        let content = "ü".repeat(CONTENT_MAX_CHARS);
        let draft = PostDraft::try_from_parts(&title, &content).expect("at the limit");
        assert_eq!(draft.title().as_str().chars().count(), 100);
        assert_eq!(draft.content().as_str().chars().count(), 2000);
    }

    #[rstest]
    fn limits_apply_after_trimming() {
        let padded = format!("  {}  ", "t".repeat(TITLE_MAX_CHARS));
        assert!(PostTitle::new(&padded).is_ok());
    }

    #[rstest]
    fn errors_name_their_field() {
        assert_eq!(PostValidationError::EmptyTitle.field(), "title");
        assert_eq!(
            PostValidationError::ContentTooLong { max: 2000 }.field(),
            "content"
        );
    }

    #[rstest]
    fn with_draft_keeps_identity_and_author() {
        let author = UserId::new("abc123").expect("valid id");
        let post = Post::new(
            PostId::new("1").expect("valid id"),
            "Old",
            "old body",
            author.clone(),
            Utc::now(),
        );
        let draft = PostDraft::try_from_parts("New", "new body").expect("valid draft");
        let edited = post.with_draft(&draft);
        assert_eq!(edited.id(), post.id());
        assert_eq!(edited.user_id(), &author);
        assert_eq!(edited.title(), "New");
        assert_eq!(edited.content(), "new body");
    }
}
