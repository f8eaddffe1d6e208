use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{paginate, Page, UserSummary},
    services::posts::post_author_id,
};

/// Likes a post and returns the refreshed like counter
///
/// `total_like` is always reset to the like-row count rather than
/// incremented, so it self-heals if it ever drifts.
pub async fn like_post(pool: &PgPool, post_id: i64, viewer_id: i64) -> AppResult<i64> {
    post_author_id(pool, post_id).await?;

    let inserted = sqlx::query(
        "INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(post_id)
    .bind(viewer_id)
    .execute(pool)
    .await?;

    if inserted.rows_affected() == 0 {
        return Err(AppError::InvalidInput(
            "Post already liked".to_string(),
        ));
    }

    let (total_like,) = refresh_like_counter(pool, post_id).await?;

    tracing::info!(post_id, viewer_id, total_like, "Post liked");

    Ok(total_like)
}

/// Removes a like and returns the refreshed like counter
pub async fn unlike_post(pool: &PgPool, post_id: i64, viewer_id: i64) -> AppResult<i64> {
    post_author_id(pool, post_id).await?;

    let deleted = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(viewer_id)
        .execute(pool)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::InvalidInput(
            "Post was not liked".to_string(),
        ));
    }

    let (total_like,) = refresh_like_counter(pool, post_id).await?;

    Ok(total_like)
}

async fn refresh_like_counter(pool: &PgPool, post_id: i64) -> AppResult<(i64,)> {
    let row: (i64,) = sqlx::query_as(
        r#"
        UPDATE posts
        SET total_like = (SELECT COUNT(*) FROM post_likes WHERE post_id = $1)
        WHERE id = $1
        RETURNING total_like
        "#,
    )
    .bind(post_id)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Users who liked a post, paginated
pub async fn likers(pool: &PgPool, post_id: i64, page: u32) -> AppResult<Page<UserSummary>> {
    post_author_id(pool, post_id).await?;

    let users: Vec<UserSummary> = sqlx::query_as(
        r#"
        SELECT u.id, u.username, u.name, u.avatar
        FROM post_likes pl
        JOIN users u ON u.id = pl.user_id
        WHERE pl.post_id = $1
        ORDER BY pl.created_at
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;

    Ok(paginate(users, page))
}

/// Whether a given user has liked a given post
pub async fn check_like(pool: &PgPool, post_id: i64, user_id: i64) -> AppResult<bool> {
    post_author_id(pool, post_id).await?;

    let row: Option<(i32,)> =
        sqlx::query_as("SELECT 1 FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.is_some())
}
