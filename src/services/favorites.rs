use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{paginate, Page, PostAuthorRow, PostSummary},
    services::posts::{ensure_user_exists, post_author_id},
};

/// Bookmarks a post for the viewer
pub async fn add_favorite(pool: &PgPool, viewer_id: i64, post_id: i64) -> AppResult<()> {
    post_author_id(pool, post_id).await?;
    ensure_user_exists(pool, viewer_id).await?;

    let inserted = sqlx::query(
        "INSERT INTO favorites (user_id, post_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(viewer_id)
    .bind(post_id)
    .execute(pool)
    .await?;

    if inserted.rows_affected() == 0 {
        return Err(AppError::InvalidInput(
            "Post already in favorites".to_string(),
        ));
    }

    Ok(())
}

/// Removes a bookmark
pub async fn remove_favorite(pool: &PgPool, viewer_id: i64, post_id: i64) -> AppResult<()> {
    let deleted = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND post_id = $2")
        .bind(viewer_id)
        .bind(post_id)
        .execute(pool)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::InvalidInput(
            "Post is not in favorites".to_string(),
        ));
    }

    Ok(())
}

/// The viewer's bookmarked posts, paginated in bookmark order
pub async fn favorites_page(
    pool: &PgPool,
    viewer_id: i64,
    page: u32,
) -> AppResult<Page<PostSummary>> {
    ensure_user_exists(pool, viewer_id).await?;

    let rows: Vec<PostAuthorRow> = sqlx::query_as(
        r#"
        SELECT p.id, p.title, p.description, p.steps, p.main_image,
               p.total_like, p.total_comment, p.total_view,
               p.created_at, p.updated_at,
               u.id AS author_id, u.username AS author_username,
               u.name AS author_name, u.avatar AS author_avatar
        FROM favorites f
        JOIN posts p ON p.id = f.post_id
        JOIN users u ON u.id = p.author_id
        WHERE f.user_id = $1
        ORDER BY f.created_at
        "#,
    )
    .bind(viewer_id)
    .fetch_all(pool)
    .await?;

    Ok(paginate(
        rows.into_iter().map(PostSummary::from).collect(),
        page,
    ))
}
