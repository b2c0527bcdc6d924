//! Feed reads and the incremental feed pager.
//!
//! [`FeedService`] fetches one window of posts, newest first. [`FeedPager`]
//! walks the windows in order, accumulating posts, and refuses to start a
//! second fetch while one is in flight or after a short page has marked the
//! feed exhausted.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pagination::{Page, PageRequest};
use tracing::debug;

use super::ports::PostRepository;
use super::posts::map_store_error;
use super::{Error, Post, PostId};

/// Rows fetched per feed page.
pub const FEED_PAGE_SIZE: u32 = pagination::DEFAULT_PAGE_SIZE;

/// Read side of the feed.
#[derive(Clone)]
pub struct FeedService {
    repo: Arc<dyn PostRepository>,
}

impl FeedService {
    /// Create the service.
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// Fetch the posts for `request`.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn page(&self, request: PageRequest) -> Result<Page<Post>, Error> {
        let rows = self.repo.list(request).await.map_err(map_store_error)?;
        debug!(page = request.page(), rows = rows.len(), "feed page fetched");
        Ok(Page::from_window(rows, request))
    }
}

/// Pager lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerStatus {
    /// Ready to fetch the next page.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// A short page was seen; nothing more to fetch.
    Exhausted,
}

/// Result of [`FeedPager::load_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched; `added` posts were new.
    Loaded {
        /// Posts appended after de-duplication.
        added: usize,
    },
    /// Another fetch was already in flight; nothing was requested.
    Busy,
    /// The feed has no further pages.
    Exhausted,
}

#[derive(Debug)]
struct PagerState {
    status: PagerStatus,
    next: Option<PageRequest>,
    posts: Vec<Post>,
    seen: HashSet<PostId>,
    pages_loaded: u32,
}

/// Accumulates feed pages one at a time.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
/// use fictures::domain::{FeedPager, FeedService, LoadOutcome};
/// use fictures::outbound::memory::InMemoryPostRepository;
///
/// # async fn walk() -> Result<(), fictures::domain::Error> {
/// let pager = FeedPager::new(FeedService::new(Arc::new(InMemoryPostRepository::default())));
/// while let LoadOutcome::Loaded { .. } = pager.load_next().await? {}
/// println!("{} posts", pager.posts().len());
/// # Ok(())
/// # }
/// ```
pub struct FeedPager {
    feed: FeedService,
    state: Mutex<PagerState>,
}

impl FeedPager {
    /// Pager positioned before the first page.
    pub fn new(feed: FeedService) -> Self {
        Self::starting_at(feed, PageRequest::first())
    }

    /// Pager whose next fetch is `request`.
    pub fn starting_at(feed: FeedService, request: PageRequest) -> Self {
        Self {
            feed,
            state: Mutex::new(PagerState {
                status: PagerStatus::Idle,
                next: Some(request),
                posts: Vec::new(),
                seen: HashSet::new(),
                pages_loaded: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current lifecycle state.
    pub fn status(&self) -> PagerStatus {
        self.lock().status
    }

    /// Posts accumulated so far, newest first.
    pub fn posts(&self) -> Vec<Post> {
        self.lock().posts.clone()
    }

    /// Number of non-empty pages fetched.
    pub fn pages_loaded(&self) -> u32 {
        self.lock().pages_loaded
    }

    /// Fetch the next page unless a fetch is in flight or the feed is
    /// exhausted.
    ///
    /// Dropping the returned future mid-fetch puts the pager back to
    /// [`PagerStatus::Idle`] so the same page can be requested again.
    ///
    /// # Errors
    /// Propagates store failures; the pager returns to idle.
    pub async fn load_next(&self) -> Result<LoadOutcome, Error> {
        let request = {
            let mut state = self.lock();
            match state.status {
                PagerStatus::Loading => return Ok(LoadOutcome::Busy),
                PagerStatus::Exhausted => return Ok(LoadOutcome::Exhausted),
                PagerStatus::Idle => {}
            }
            let Some(request) = state.next else {
                state.status = PagerStatus::Exhausted;
                return Ok(LoadOutcome::Exhausted);
            };
            state.status = PagerStatus::Loading;
            request
        };

        // Declared before `state` so the state lock is released before the
        // guard inspects it on drop.
        let _guard = LoadingGuard { pager: self };
        let page = self.feed.page(request).await?;

        let mut state = self.lock();
        let next = page.next_request();
        let mut added = 0;
        for post in page.into_items() {
            if state.seen.insert(post.id().clone()) {
                state.posts.push(post);
                added += 1;
            }
        }
        if added > 0 {
            state.pages_loaded += 1;
        }
        state.next = next;
        state.status = if next.is_some() {
            PagerStatus::Idle
        } else {
            PagerStatus::Exhausted
        };
        Ok(LoadOutcome::Loaded { added })
    }
}

/// Returns a loading pager to idle when a fetch ends without a page.
struct LoadingGuard<'a> {
    pager: &'a FeedPager,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.pager.lock();
        if state.status == PagerStatus::Loading {
            state.status = PagerStatus::Idle;
        }
    }
}
