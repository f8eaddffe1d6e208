use async_trait::async_trait;
use std::collections::HashSet;

use crate::{
    error::AppResult,
    models::{PostSummary, ViewerSnapshot},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryFeedStore;
pub use postgres::PgFeedStore;

/// Data-access seam for the newsfeed ranker
///
/// The ranker only ever needs these four operations; everything else about
/// persistence stays behind this trait so the scoring logic can be exercised
/// against mocks or the in-memory store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Returns the set of user ids the viewer follows
    async fn followed_author_ids(&self, viewer_id: i64) -> AppResult<HashSet<i64>>;

    /// Returns the viewer row plus the post ids already shown to them
    ///
    /// Fails with `NotFound` when the viewer does not exist.
    async fn viewer_with_viewed_posts(&self, viewer_id: i64) -> AppResult<ViewerSnapshot>;

    /// Returns the candidate pool for one ranking call
    ///
    /// Posts not in `exclude`, unioned with posts authored by
    /// `self_author_id` that have at least one comment. Enumeration order is
    /// deterministic; the ranker's stable sort preserves it on score ties.
    async fn candidate_posts(
        &self,
        exclude: &HashSet<i64>,
        self_author_id: i64,
    ) -> AppResult<Vec<PostSummary>>;

    /// Persists the union of the existing viewed-set and `post_ids`
    async fn append_viewed_posts(&self, viewer_id: i64, post_ids: &[i64]) -> AppResult<()>;
}
