//! In-memory post repository for local development and tests.

use async_trait::async_trait;
use chrono::Utc;
use pagination::PageRequest;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::ports::{PostRepository, PostStoreError, WriteOutcome};
use crate::domain::{Actor, Post, PostDraft, PostId};

/// Posts held in process memory, newest first.
#[derive(Debug, Default)]
pub struct InMemoryPostRepository {
    rows: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    /// Repository pre-populated with `posts`.
    pub fn with_posts(mut posts: Vec<Post>) -> Self {
        posts.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Self {
            rows: RwLock::new(posts),
        }
    }

    /// Number of stored posts.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Whether the store holds no posts.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

fn window_bounds(window: PageRequest, total: usize) -> (usize, usize) {
    let start = usize::try_from(window.offset()).unwrap_or(usize::MAX).min(total);
    let len = usize::try_from(window.size()).unwrap_or(usize::MAX);
    (start, start.saturating_add(len).min(total))
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(&self, window: PageRequest) -> Result<Vec<Post>, PostStoreError> {
        let rows = self.rows.read().await;
        let (start, end) = window_bounds(window, rows.len());
        Ok(rows.get(start..end).map(<[Post]>::to_vec).unwrap_or_default())
    }

    async fn find(&self, id: &PostId) -> Result<Option<Post>, PostStoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|post| post.id() == id).cloned())
    }

    async fn insert(&self, actor: &Actor, draft: &PostDraft) -> Result<Post, PostStoreError> {
        let id = PostId::new(Uuid::new_v4().to_string())
            .map_err(|err| PostStoreError::rejected(err.to_string()))?;
        let post = Post::new(
            id,
            draft.title().as_str(),
            draft.content().as_str(),
            actor.user_id().clone(),
            Utc::now(),
        );
        self.rows.write().await.insert(0, post.clone());
        Ok(post)
    }

    async fn update(
        &self,
        actor: &Actor,
        id: &PostId,
        draft: &PostDraft,
    ) -> Result<WriteOutcome, PostStoreError> {
        let mut rows = self.rows.write().await;
        let matched = rows
            .iter_mut()
            .find(|post| post.id() == id && post.user_id() == actor.user_id());
        Ok(match matched {
            Some(post) => {
                *post = post.with_draft(draft);
                WriteOutcome::Applied
            }
            None => WriteOutcome::NoMatch,
        })
    }

    async fn delete(&self, actor: &Actor, id: &PostId) -> Result<WriteOutcome, PostStoreError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|post| !(post.id() == id && post.user_id() == actor.user_id()));
        Ok(if rows.len() < before {
            WriteOutcome::Applied
        } else {
            WriteOutcome::NoMatch
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{AccessToken, UserId};
    use rstest::{fixture, rstest};

    fn actor(user: &str) -> Actor {
        Actor::new(UserId::new(user).expect("user id"), AccessToken::new("t"))
    }

    #[fixture]
    fn draft() -> PostDraft {
        PostDraft::try_from_parts("Hello", "World").expect("draft")
    }

    #[rstest]
    #[tokio::test]
    async fn inserted_post_reads_back(draft: PostDraft) {
        let repo = InMemoryPostRepository::default();
        let stored = repo.insert(&actor("abc123"), &draft).await.expect("insert");

        let found = repo.find(stored.id()).await.expect("find").expect("present");
        assert_eq!(found.title(), "Hello");
        assert_eq!(found.content(), "World");
        assert_eq!(found.user_id().as_str(), "abc123");
    }

    #[rstest]
    #[tokio::test]
    async fn writes_by_other_authors_leave_rows_intact(draft: PostDraft) {
        let repo = InMemoryPostRepository::default();
        let stored = repo.insert(&actor("abc123"), &draft).await.expect("insert");
        let edit = PostDraft::try_from_parts("Hijacked", "nope").expect("draft");

        let updated = repo
            .update(&actor("mallory"), stored.id(), &edit)
            .await
            .expect("update");
        let deleted = repo.delete(&actor("mallory"), stored.id()).await.expect("delete");

        assert_eq!(updated, WriteOutcome::NoMatch);
        assert_eq!(deleted, WriteOutcome::NoMatch);
        let found = repo.find(stored.id()).await.expect("find").expect("present");
        assert_eq!(found, stored);
    }

    #[rstest]
    #[tokio::test]
    async fn author_can_update_and_delete(draft: PostDraft) {
        let repo = InMemoryPostRepository::default();
        let author = actor("abc123");
        let stored = repo.insert(&author, &draft).await.expect("insert");
        let edit = PostDraft::try_from_parts("Edited", "Body").expect("draft");

        assert_eq!(
            repo.update(&author, stored.id(), &edit).await.expect("update"),
            WriteOutcome::Applied
        );
        let found = repo.find(stored.id()).await.expect("find").expect("present");
        assert_eq!(found.title(), "Edited");
        assert_eq!(found.created_at(), stored.created_at());

        assert_eq!(
            repo.delete(&author, stored.id()).await.expect("delete"),
            WriteOutcome::Applied
        );
        assert!(repo.is_empty().await);
    }

    #[rstest]
    #[case(0, 10)]
    #[case(1, 10)]
    #[case(2, 5)]
    #[case(3, 0)]
    #[tokio::test]
    async fn list_returns_the_requested_window(#[case] page: u32, #[case] expected: usize) {
        let repo = InMemoryPostRepository::default();
        let draft = PostDraft::try_from_parts("Hello", "World").expect("draft");
        for _ in 0..25 {
            repo.insert(&actor("abc123"), &draft).await.expect("insert");
        }
        let window = PageRequest::new(page, 10).expect("page size");
        assert_eq!(repo.list(window).await.expect("list").len(), expected);
    }
}
