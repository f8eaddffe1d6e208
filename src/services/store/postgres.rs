use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    models::{PostAuthorRow, PostSummary, UserSummary, ViewerSnapshot},
    services::store::FeedStore,
};

/// PostgreSQL-backed feed store
///
/// One ranking call performs three reads and one conditional write. The
/// read-then-append on `viewed_posts` is intentionally not transactional;
/// concurrent calls for the same viewer race with last-write-wins semantics.
pub struct PgFeedStore {
    pool: PgPool,
}

impl PgFeedStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedStore for PgFeedStore {
    async fn followed_author_ids(&self, viewer_id: i64) -> AppResult<HashSet<i64>> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT followee_id FROM follows WHERE follower_id = $1")
                .bind(viewer_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn viewer_with_viewed_posts(&self, viewer_id: i64) -> AppResult<ViewerSnapshot> {
        let viewer: Option<UserSummary> =
            sqlx::query_as("SELECT id, username, name, avatar FROM users WHERE id = $1")
                .bind(viewer_id)
                .fetch_optional(&self.pool)
                .await?;

        let viewer = viewer
            .ok_or_else(|| AppError::NotFound("User does not exist".to_string()))?;

        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT post_id FROM viewed_posts WHERE user_id = $1")
                .bind(viewer_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ViewerSnapshot {
            viewer,
            viewed_posts: rows.into_iter().map(|(id,)| id).collect(),
        })
    }

    async fn candidate_posts(
        &self,
        exclude: &HashSet<i64>,
        self_author_id: i64,
    ) -> AppResult<Vec<PostSummary>> {
        let exclude: Vec<i64> = exclude.iter().copied().collect();

        // With an empty exclusion list the first clause is true for every
        // post, so the pool degenerates to "all posts".
        let rows: Vec<PostAuthorRow> = sqlx::query_as(
            r#"
            SELECT p.id, p.title, p.description, p.steps, p.main_image,
                   p.total_like, p.total_comment, p.total_view,
                   p.created_at, p.updated_at,
                   u.id AS author_id, u.username AS author_username,
                   u.name AS author_name, u.avatar AS author_avatar
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.id <> ALL($1)
               OR (p.author_id = $2 AND p.total_comment > 0)
            ORDER BY p.id
            "#,
        )
        .bind(&exclude)
        .bind(self_author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostSummary::from).collect())
    }

    async fn append_viewed_posts(&self, viewer_id: i64, post_ids: &[i64]) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO viewed_posts (user_id, post_id)
            SELECT $1, unnest($2::bigint[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(viewer_id)
        .bind(post_ids)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
