//! Offset pagination primitives for the Fictures feed.
//!
//! A [`PageRequest`] names a fixed-size window of rows (`page * size` up to
//! `page * size + size - 1`). Endpoints hand the next window to clients as an
//! opaque [`PageCursor`] so the page arithmetic stays on the server, and wrap
//! fetched rows in a [`Page`] envelope that knows whether another page may
//! follow.

use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rows per feed page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Errors raised while building or decoding page requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    /// A window must contain at least one row.
    #[error("page size must be greater than zero")]
    ZeroSize,
    /// The cursor is not valid URL-safe base64.
    #[error("page cursor is not valid base64: {message}")]
    InvalidEncoding { message: String },
    /// The cursor decoded but does not describe a page.
    #[error("page cursor payload is malformed: {message}")]
    InvalidPayload { message: String },
}

/// A fixed-size window of rows, addressed by page number.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(2, 10).expect("non-zero size");
/// assert_eq!(request.offset(), 20);
/// assert_eq!(request.last_index(), 29);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest", into = "RawPageRequest")]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Build a request for `page` with `size` rows per page.
    ///
    /// # Errors
    /// Returns [`PageError::ZeroSize`] when `size` is zero.
    pub const fn new(page: u32, size: u32) -> Result<Self, PageError> {
        if size == 0 {
            return Err(PageError::ZeroSize);
        }
        Ok(Self { page, size })
    }

    /// The first page using [`DEFAULT_PAGE_SIZE`].
    #[must_use]
    pub const fn first() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Zero-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Rows per page.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Index of the first row in the window.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Index of the last row in the window (inclusive).
    #[must_use]
    pub fn last_index(&self) -> u64 {
        self.offset() + u64::from(self.size) - 1
    }

    /// The window directly after this one, if the page counter has room.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        self.page.checked_add(1).map(|page| Self {
            page,
            size: self.size,
        })
    }

    /// Encode this request as an opaque cursor.
    #[must_use]
    pub fn cursor(&self) -> PageCursor {
        PageCursor::from(*self)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

#[derive(Serialize, Deserialize)]
struct RawPageRequest {
    #[serde(rename = "p")]
    page: u32,
    #[serde(rename = "s")]
    size: u32,
}

impl From<PageRequest> for RawPageRequest {
    fn from(value: PageRequest) -> Self {
        Self {
            page: value.page,
            size: value.size,
        }
    }
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = PageError;

    fn try_from(value: RawPageRequest) -> Result<Self, Self::Error> {
        Self::new(value.page, value.size)
    }
}

/// Opaque, URL-safe token naming a [`PageRequest`].
///
/// Cursors are safe to embed in query strings and HTML attributes without
/// further escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageCursor(String);

impl PageCursor {
    /// Borrow the encoded cursor.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Decode the cursor back into the request it names.
    ///
    /// # Errors
    /// Returns [`PageError`] when the token is not a cursor issued by
    /// [`PageRequest::cursor`].
    pub fn decode(&self) -> Result<PageRequest, PageError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(self.0.as_bytes())
            .map_err(|error| PageError::InvalidEncoding {
                message: error.to_string(),
            })?;
        serde_json::from_slice(&bytes).map_err(|error| PageError::InvalidPayload {
            message: error.to_string(),
        })
    }
}

impl From<PageRequest> for PageCursor {
    fn from(request: PageRequest) -> Self {
        // Serialising two integers cannot fail.
        let json = serde_json::to_vec(&request).unwrap_or_default();
        Self(URL_SAFE_NO_PAD.encode(json))
    }
}

impl FromStr for PageCursor {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cursor = Self(s.trim().to_owned());
        cursor.decode()?;
        Ok(cursor)
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rows fetched for one [`PageRequest`].
///
/// A window that came back full may be followed by another page; a short
/// window is the end of the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    request: PageRequest,
    next: Option<PageRequest>,
}

impl<T> Page<T> {
    /// Wrap the rows returned for `request`.
    #[must_use]
    pub fn from_window(items: Vec<T>, request: PageRequest) -> Self {
        let full = u64::try_from(items.len()).is_ok_and(|len| len >= u64::from(request.size));
        let next = if full { request.next() } else { None };
        Self {
            items,
            request,
            next,
        }
    }

    /// The rows in this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the envelope, returning its rows.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// The window these rows were fetched for.
    #[must_use]
    pub const fn request(&self) -> PageRequest {
        self.request
    }

    /// The window to fetch next, or `None` once the data is exhausted.
    #[must_use]
    pub const fn next_request(&self) -> Option<PageRequest> {
        self.next
    }

    /// Cursor for the next window, if any.
    #[must_use]
    pub fn next_cursor(&self) -> Option<PageCursor> {
        self.next.map(PageCursor::from)
    }

    /// True when no further page follows.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.next.is_none()
    }

    /// Transform the rows while keeping the window metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            request: self.request,
            next: self.next,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for page arithmetic and cursor handling.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 9)]
    #[case(1, 10, 19)]
    #[case(7, 70, 79)]
    fn windows_cover_ten_rows(#[case] page: u32, #[case] offset: u64, #[case] last: u64) {
        let request = PageRequest::new(page, DEFAULT_PAGE_SIZE).expect("valid size");
        assert_eq!(request.offset(), offset);
        assert_eq!(request.last_index(), last);
    }

    #[rstest]
    fn zero_size_is_rejected() {
        assert_eq!(PageRequest::new(3, 0), Err(PageError::ZeroSize));
    }

    #[rstest]
    fn last_page_number_has_no_successor() {
        let request = PageRequest::new(u32::MAX, 10).expect("valid size");
        assert!(request.next().is_none());
        assert_eq!(request.last_index(), u64::from(u32::MAX) * 10 + 9);
    }

    #[rstest]
    fn cursor_decodes_to_the_same_window() {
        let request = PageRequest::new(4, 10).expect("valid size");
        let cursor = request.cursor();
        assert!(
            cursor
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "cursor must be URL safe: {cursor}"
        );
        let parsed: PageCursor = cursor.as_str().parse().expect("cursor parses");
        assert_eq!(parsed.decode(), Ok(request));
    }

    #[rstest]
    #[case::not_base64("***")]
    #[case::not_json("aGVsbG8")]
    fn malformed_cursors_are_rejected(#[case] raw: &str) {
        assert!(raw.parse::<PageCursor>().is_err());
    }

    #[rstest]
    fn cursor_with_zero_size_is_rejected() {
        let forged = URL_SAFE_NO_PAD.encode(br#"{"p":1,"s":0}"#);
        let err = forged.parse::<PageCursor>().expect_err("zero size");
        assert!(matches!(err, PageError::InvalidPayload { .. }));
    }

    #[rstest]
    #[case::full(10, Some(3))]
    #[case::short(9, None)]
    #[case::empty(0, None)]
    fn next_page_follows_only_full_windows(#[case] rows: usize, #[case] next: Option<u32>) {
        let request = PageRequest::new(2, 10).expect("valid size");
        let page = Page::from_window(vec![(); rows], request);
        assert_eq!(page.next_request().map(|r| r.page()), next);
        assert_eq!(page.is_last(), next.is_none());
    }

    #[rstest]
    fn map_keeps_window_metadata() {
        let request = PageRequest::first();
        let page = Page::from_window((0..10).collect::<Vec<u32>>(), request).map(|n| n * 2);
        assert_eq!(page.items().last(), Some(&18));
        assert_eq!(page.request(), request);
        assert!(page.next_cursor().is_some());
    }
}
