use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    models::PostSummary,
    services::store::FeedStore,
};

/// Multiplier applied to posts from followed authors
const FOLLOWED_BOOST: f64 = 5.0;

/// Relevance score for one candidate post
///
/// `is_mine` zeroes the whole product for the viewer's own posts, so a
/// self-authored candidate always lands at exactly -1 and sorts below every
/// other candidate (which scores >= 0). That collapse is load-bearing: own
/// commented posts surface only as tail filler.
pub fn score_post(post: &PostSummary, viewer_id: i64, followed: &HashSet<i64>) -> f64 {
    let is_mine = if post.author.id == viewer_id { 0.0 } else { 1.0 };
    let is_followed = if followed.contains(&post.author.id) {
        FOLLOWED_BOOST
    } else {
        1.0
    };

    let engagement =
        (post.total_like + post.total_comment) as f64 + (post.total_view as f64).sqrt();

    engagement.sqrt() * is_followed * is_mine - (1.0 - is_mine)
}

/// Assembles one page of the viewer's newsfeed
///
/// Fetches the follow set and viewed-set, scores the candidate pool, returns
/// the top `limit` posts, and records the returned non-self posts as viewed.
/// Own posts are never recorded, which keeps them eligible on every call.
pub async fn build_newsfeed(
    store: &dyn FeedStore,
    viewer_id: i64,
    limit: usize,
) -> AppResult<Vec<PostSummary>> {
    let followed = store.followed_author_ids(viewer_id).await?;
    let snapshot = store.viewer_with_viewed_posts(viewer_id).await?;

    let candidates = store
        .candidate_posts(&snapshot.viewed_posts, viewer_id)
        .await?;
    let pool_size = candidates.len();

    let mut scored: Vec<(f64, PostSummary)> = candidates
        .into_iter()
        .map(|post| (score_post(&post, viewer_id, &followed), post))
        .collect();

    // Stable sort: ties keep candidate enumeration order
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(limit);

    let feed: Vec<PostSummary> = scored.into_iter().map(|(_, post)| post).collect();

    let newly_viewed: Vec<i64> = feed
        .iter()
        .filter(|post| post.author.id != viewer_id)
        .map(|post| post.id)
        .collect();

    if !newly_viewed.is_empty() {
        store.append_viewed_posts(viewer_id, &newly_viewed).await?;
    }

    tracing::info!(
        viewer_id,
        candidates = pool_size,
        returned = feed.len(),
        tracked = newly_viewed.len(),
        "Newsfeed assembled"
    );

    Ok(feed)
}

/// Availability-over-correctness wrapper for the feed route
///
/// `NotFound` (unknown viewer) propagates unchanged. Every other fault is
/// logged and collapsed into an empty feed, so callers must treat "no posts"
/// as a possible transient outcome rather than proof of an empty pool.
pub async fn newsfeed_or_empty(
    store: &dyn FeedStore,
    viewer_id: i64,
    limit: usize,
) -> AppResult<Vec<PostSummary>> {
    match build_newsfeed(store, viewer_id, limit).await {
        Ok(feed) => Ok(feed),
        Err(AppError::NotFound(msg)) => Err(AppError::NotFound(msg)),
        Err(e) => {
            tracing::error!(error = %e, viewer_id, "Newsfeed assembly failed, serving empty feed");
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{UserSummary, ViewerSnapshot};
    use crate::services::store::{MemoryFeedStore, MockFeedStore};
    use chrono::Utc;

    const VIEWER: i64 = 1;

    fn user(id: i64) -> UserSummary {
        UserSummary {
            id,
            username: format!("user{}", id),
            name: format!("User {}", id),
            avatar: None,
        }
    }

    fn post(id: i64, author_id: i64, likes: i64, comments: i64, views: i64) -> PostSummary {
        PostSummary {
            id,
            author: user(author_id),
            title: format!("post {}", id),
            description: "body".to_string(),
            main_image: None,
            total_like: likes,
            total_comment: comments,
            total_view: views,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn snapshot(viewer_id: i64) -> ViewerSnapshot {
        ViewerSnapshot {
            viewer: user(viewer_id),
            viewed_posts: HashSet::new(),
        }
    }

    /// Mock store returning a fixed candidate pool and empty viewed-set
    fn mock_store(followed: Vec<i64>, candidates: Vec<PostSummary>) -> MockFeedStore {
        let mut store = MockFeedStore::new();
        store
            .expect_followed_author_ids()
            .returning(move |_| Ok(followed.iter().copied().collect()));
        store
            .expect_viewer_with_viewed_posts()
            .returning(|viewer_id| Ok(snapshot(viewer_id)));
        store
            .expect_candidate_posts()
            .returning(move |_, _| Ok(candidates.clone()));
        store.expect_append_viewed_posts().returning(|_, _| Ok(()));
        store
    }

    #[test]
    fn test_score_worked_example() {
        let followed: HashSet<i64> = [2].into_iter().collect();

        // P1: followed author, likes=4, views=9 -> sqrt(4 + sqrt(9)) * 5
        let p1 = post(10, 2, 4, 0, 9);
        let s1 = score_post(&p1, VIEWER, &followed);
        assert!((s1 - 7.0_f64.sqrt() * 5.0).abs() < 1e-9);

        // P2: unfollowed author, likes=10 -> sqrt(10)
        let p2 = post(11, 3, 10, 0, 0);
        let s2 = score_post(&p2, VIEWER, &followed);
        assert!((s2 - 10.0_f64.sqrt()).abs() < 1e-9);

        assert!(s1 > s2);
    }

    #[test]
    fn test_score_zero_engagement_ties_regardless_of_follow() {
        let followed: HashSet<i64> = [2].into_iter().collect();
        let from_followed = score_post(&post(1, 2, 0, 0, 0), VIEWER, &followed);
        let from_stranger = score_post(&post(2, 3, 0, 0, 0), VIEWER, &followed);
        assert_eq!(from_followed, 0.0);
        assert_eq!(from_stranger, 0.0);
    }

    #[test]
    fn test_score_followed_boost_is_monotonic() {
        let followed: HashSet<i64> = [2].into_iter().collect();
        let boosted = score_post(&post(1, 2, 3, 1, 4), VIEWER, &followed);
        let plain = score_post(&post(2, 3, 3, 1, 4), VIEWER, &followed);
        assert!((boosted - plain * 5.0).abs() < 1e-9);
        assert!(boosted > plain);
    }

    #[test]
    fn test_score_self_post_is_minus_one() {
        let followed = HashSet::new();
        // Engagement is ignored entirely for the viewer's own posts
        let own = score_post(&post(1, VIEWER, 100, 50, 10_000), VIEWER, &followed);
        assert_eq!(own, -1.0);
    }

    #[tokio::test]
    async fn test_feed_bounded_by_limit() {
        let candidates: Vec<PostSummary> =
            (1..=8).map(|id| post(id, 2, id, 0, 0)).collect();
        let store = mock_store(vec![], candidates);

        let feed = build_newsfeed(&store, VIEWER, 3).await.unwrap();
        assert_eq!(feed.len(), 3);
    }

    #[tokio::test]
    async fn test_feed_bounded_by_pool_size() {
        let store = mock_store(vec![], vec![post(1, 2, 0, 0, 0)]);
        let feed = build_newsfeed(&store, VIEWER, 10).await.unwrap();
        assert_eq!(feed.len(), 1);
    }

    #[tokio::test]
    async fn test_feed_orders_worked_example() {
        // Viewer follows author 2. P1 scores ~13.23, P2 ~3.16.
        let p1 = post(10, 2, 4, 0, 9);
        let p2 = post(11, 3, 10, 0, 0);
        let store = mock_store(vec![2], vec![p2.clone(), p1.clone()]);

        let feed = build_newsfeed(&store, VIEWER, 2).await.unwrap();
        let ids: Vec<i64> = feed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[tokio::test]
    async fn test_feed_self_posts_rank_last() {
        // Own commented post vs a zero-engagement stranger post
        let own = post(1, VIEWER, 9, 3, 100);
        let stranger = post(2, 3, 0, 0, 0);
        let store = mock_store(vec![], vec![own, stranger]);

        let feed = build_newsfeed(&store, VIEWER, 2).await.unwrap();
        let ids: Vec<i64> = feed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_feed_ties_keep_enumeration_order() {
        let a = post(1, 2, 0, 0, 0);
        let b = post(2, 3, 0, 0, 0);
        let c = post(3, 4, 0, 0, 0);
        let store = mock_store(vec![], vec![a, b, c]);

        let feed = build_newsfeed(&store, VIEWER, 3).await.unwrap();
        let ids: Vec<i64> = feed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_feed_tracks_only_non_self_posts() {
        let mut store = MockFeedStore::new();
        store
            .expect_followed_author_ids()
            .returning(|_| Ok(HashSet::new()));
        store
            .expect_viewer_with_viewed_posts()
            .returning(|viewer_id| Ok(snapshot(viewer_id)));
        let own = post(1, VIEWER, 0, 3, 0);
        let stranger = post(2, 3, 0, 0, 0);
        store
            .expect_candidate_posts()
            .returning(move |_, _| Ok(vec![own.clone(), stranger.clone()]));
        store
            .expect_append_viewed_posts()
            .withf(|viewer_id, ids| *viewer_id == VIEWER && ids == [2])
            .times(1)
            .returning(|_, _| Ok(()));

        build_newsfeed(&store, VIEWER, 10).await.unwrap();
    }

    #[tokio::test]
    async fn test_feed_skips_append_when_nothing_tracked() {
        // All returned posts are the viewer's own; no write must happen
        let mut store = MockFeedStore::new();
        store
            .expect_followed_author_ids()
            .returning(|_| Ok(HashSet::new()));
        store
            .expect_viewer_with_viewed_posts()
            .returning(|viewer_id| Ok(snapshot(viewer_id)));
        let own = post(1, VIEWER, 0, 3, 0);
        store
            .expect_candidate_posts()
            .returning(move |_, _| Ok(vec![own.clone()]));
        store.expect_append_viewed_posts().times(0);

        let feed = build_newsfeed(&store, VIEWER, 10).await.unwrap();
        assert_eq!(feed.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_viewer_is_not_found_with_no_side_effects() {
        let mut store = MockFeedStore::new();
        store
            .expect_followed_author_ids()
            .returning(|_| Ok(HashSet::new()));
        store
            .expect_viewer_with_viewed_posts()
            .returning(|_| Err(AppError::NotFound("User does not exist".to_string())));
        store.expect_candidate_posts().times(0);
        store.expect_append_viewed_posts().times(0);

        let result = build_newsfeed(&store, 99, 10).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fallback_serves_empty_feed_on_transient_fault() {
        let mut store = MockFeedStore::new();
        store
            .expect_followed_author_ids()
            .returning(|_| Err(AppError::Internal("connection reset".to_string())));

        let feed = newsfeed_or_empty(&store, VIEWER, 10).await.unwrap();
        assert!(feed.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_preserves_not_found() {
        let mut store = MockFeedStore::new();
        store
            .expect_followed_author_ids()
            .returning(|_| Ok(HashSet::new()));
        store
            .expect_viewer_with_viewed_posts()
            .returning(|_| Err(AppError::NotFound("User does not exist".to_string())));

        let result = newsfeed_or_empty(&store, 99, 10).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_view_tracking_is_idempotent_across_calls() {
        let store = MemoryFeedStore::new();
        store.add_user(user(VIEWER)).await;
        store.add_user(user(2)).await;
        store.add_follow(VIEWER, 2).await;

        // Static pool: four stranger posts and one own commented post
        for id in 1..=4 {
            store.add_post(post(id, 2, id, 0, 0)).await;
        }
        store.add_post(post(5, VIEWER, 0, 2, 0)).await;

        let first = build_newsfeed(&store, VIEWER, 2).await.unwrap();
        let second = build_newsfeed(&store, VIEWER, 2).await.unwrap();

        let first_ids: HashSet<i64> = first.iter().map(|p| p.id).collect();
        let second_ids: HashSet<i64> = second.iter().map(|p| p.id).collect();

        // No non-self post repeats across the two calls
        assert!(first_ids.is_disjoint(&second_ids));

        // Third call: only the own commented post is left, and it reappears
        let third = build_newsfeed(&store, VIEWER, 2).await.unwrap();
        let third_ids: Vec<i64> = third.iter().map(|p| p.id).collect();
        assert_eq!(third_ids, vec![5]);

        let fourth = build_newsfeed(&store, VIEWER, 2).await.unwrap();
        let fourth_ids: Vec<i64> = fourth.iter().map(|p| p.id).collect();
        assert_eq!(fourth_ids, vec![5]);

        // The viewed-set holds exactly the four stranger posts, never the own one
        let viewed = store.viewed_posts(VIEWER).await;
        assert_eq!(viewed, (1..=4).collect::<HashSet<i64>>());
    }
}
