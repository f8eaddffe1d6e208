use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::UserSummary,
    services::posts::ensure_user_exists,
};

/// Creates a follow edge and bumps both denormalized counters
pub async fn follow_user(pool: &PgPool, viewer_id: i64, target_id: i64) -> AppResult<()> {
    if viewer_id == target_id {
        return Err(AppError::InvalidInput(
            "Cannot follow yourself".to_string(),
        ));
    }

    ensure_user_exists(pool, target_id).await?;
    ensure_user_exists(pool, viewer_id).await?;

    let inserted = sqlx::query(
        "INSERT INTO follows (follower_id, followee_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(viewer_id)
    .bind(target_id)
    .execute(pool)
    .await?;

    if inserted.rows_affected() == 0 {
        return Err(AppError::InvalidInput(
            "Already following this user".to_string(),
        ));
    }

    sqlx::query("UPDATE users SET total_following = total_following + 1 WHERE id = $1")
        .bind(viewer_id)
        .execute(pool)
        .await?;
    sqlx::query("UPDATE users SET total_followers = total_followers + 1 WHERE id = $1")
        .bind(target_id)
        .execute(pool)
        .await?;

    tracing::info!(follower_id = viewer_id, followee_id = target_id, "Follow created");

    Ok(())
}

/// Removes a follow edge and decrements both counters
pub async fn unfollow_user(pool: &PgPool, viewer_id: i64, target_id: i64) -> AppResult<()> {
    let deleted = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
        .bind(viewer_id)
        .bind(target_id)
        .execute(pool)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::InvalidInput(
            "Not following this user".to_string(),
        ));
    }

    sqlx::query("UPDATE users SET total_following = GREATEST(total_following - 1, 0) WHERE id = $1")
        .bind(viewer_id)
        .execute(pool)
        .await?;
    sqlx::query("UPDATE users SET total_followers = GREATEST(total_followers - 1, 0) WHERE id = $1")
        .bind(target_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Users following the given user
pub async fn followers(pool: &PgPool, user_id: i64) -> AppResult<Vec<UserSummary>> {
    ensure_user_exists(pool, user_id).await?;

    let users: Vec<UserSummary> = sqlx::query_as(
        r#"
        SELECT u.id, u.username, u.name, u.avatar
        FROM follows f
        JOIN users u ON u.id = f.follower_id
        WHERE f.followee_id = $1
        ORDER BY f.created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Users the given user follows
pub async fn following(pool: &PgPool, user_id: i64) -> AppResult<Vec<UserSummary>> {
    ensure_user_exists(pool, user_id).await?;

    let users: Vec<UserSummary> = sqlx::query_as(
        r#"
        SELECT u.id, u.username, u.name, u.avatar
        FROM follows f
        JOIN users u ON u.id = f.followee_id
        WHERE f.follower_id = $1
        ORDER BY f.created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Whether `follower_id` follows `followee_id`
pub async fn is_following(pool: &PgPool, follower_id: i64, followee_id: i64) -> AppResult<bool> {
    let row: Option<(i32,)> =
        sqlx::query_as("SELECT 1 FROM follows WHERE follower_id = $1 AND followee_id = $2")
            .bind(follower_id)
            .bind(followee_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.is_some())
}
