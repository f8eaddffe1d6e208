use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

use crate::{
    error::{AppError, AppResult},
    models::{PostSummary, UserSummary, ViewerSnapshot},
    services::store::FeedStore,
};

#[derive(Default)]
struct Inner {
    users: HashMap<i64, UserSummary>,
    /// Insertion order doubles as the candidate enumeration order
    posts: Vec<PostSummary>,
    follows: HashSet<(i64, i64)>,
    viewed: HashMap<i64, HashSet<i64>>,
}

/// In-memory feed store
///
/// Backs the integration tests and database-free local runs. Candidate
/// enumeration order is post insertion order, mirroring the id-ordered
/// enumeration of the PostgreSQL store.
#[derive(Default)]
pub struct MemoryFeedStore {
    inner: Mutex<Inner>,
}

impl MemoryFeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user: UserSummary) {
        let mut inner = self.inner.lock().await;
        inner.users.insert(user.id, user);
    }

    pub async fn add_post(&self, post: PostSummary) {
        let mut inner = self.inner.lock().await;
        inner.posts.push(post);
    }

    pub async fn add_follow(&self, follower_id: i64, followee_id: i64) {
        let mut inner = self.inner.lock().await;
        inner.follows.insert((follower_id, followee_id));
    }

    /// Snapshot of a viewer's recorded impressions, for assertions
    pub async fn viewed_posts(&self, viewer_id: i64) -> HashSet<i64> {
        let inner = self.inner.lock().await;
        inner.viewed.get(&viewer_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl FeedStore for MemoryFeedStore {
    async fn followed_author_ids(&self, viewer_id: i64) -> AppResult<HashSet<i64>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .follows
            .iter()
            .filter(|(follower, _)| *follower == viewer_id)
            .map(|(_, followee)| *followee)
            .collect())
    }

    async fn viewer_with_viewed_posts(&self, viewer_id: i64) -> AppResult<ViewerSnapshot> {
        let inner = self.inner.lock().await;
        let viewer = inner
            .users
            .get(&viewer_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User does not exist".to_string()))?;

        Ok(ViewerSnapshot {
            viewer,
            viewed_posts: inner.viewed.get(&viewer_id).cloned().unwrap_or_default(),
        })
    }

    async fn candidate_posts(
        &self,
        exclude: &HashSet<i64>,
        self_author_id: i64,
    ) -> AppResult<Vec<PostSummary>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .posts
            .iter()
            .filter(|post| {
                !exclude.contains(&post.id)
                    || (post.author.id == self_author_id && post.total_comment > 0)
            })
            .cloned()
            .collect())
    }

    async fn append_viewed_posts(&self, viewer_id: i64, post_ids: &[i64]) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        inner
            .viewed
            .entry(viewer_id)
            .or_default()
            .extend(post_ids.iter().copied());
        Ok(())
    }
}
