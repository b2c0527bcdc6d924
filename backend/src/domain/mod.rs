//! Domain primitives, services and ports.
//!
//! Purpose: define strongly typed entities and the use-cases the HTTP
//! screens and the CLI drive. Nothing in here knows about actix, reqwest or
//! cookies; adapters plug in through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport agnostic failures.
//! - Post, PostDraft, PostId: the post model and draft validation.
//! - Identity, AuthSession, Credentials: who is acting.
//! - PostService, FeedService, FeedPager, IdentityResolver: use-cases.
//! - MarkdownRenderer: content to sanitised HTML.

pub mod auth;
pub mod demo_posts;
pub mod error;
pub mod feed;
pub mod identity;
pub mod markdown;
pub mod ports;
pub mod post;
pub mod posts;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    AccessToken, Actor, AuthSession, Credentials, CredentialsValidationError, Email, Identity,
    PASSWORD_MIN_CHARS, RefreshToken, SignUpOutcome, TOKEN_EXPIRY_MARGIN_SECS, generate_password,
    is_strong_password,
};
pub use self::demo_posts::{DEMO_AUTHOR, demo_posts};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::feed::{FEED_PAGE_SIZE, FeedPager, FeedService, LoadOutcome, PagerStatus};
pub use self::identity::{IdentityResolver, ResolvedAuthor};
pub use self::markdown::{MarkdownRenderer, RenderedHtml};
pub use self::post::{
    CONTENT_MAX_CHARS, Post, PostContent, PostDraft, PostId, PostTitle, PostValidationError,
    TITLE_MAX_CHARS,
};
pub use self::posts::{CreatedPost, EditAccess, PostService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{AUTHOR_LABEL_CHARS, UserId, UserIdValidationError};
