use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{paginate, CommentAuthorRow, CommentView, Page},
    services::posts::{ensure_user_exists, post_author_id},
};

/// Adds a comment and bumps the post's comment counter
pub async fn add_comment(
    pool: &PgPool,
    post_id: i64,
    author_id: i64,
    content: &str,
) -> AppResult<CommentView> {
    if content.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Comment must not be empty".to_string(),
        ));
    }

    post_author_id(pool, post_id).await?;
    ensure_user_exists(pool, author_id).await?;

    let (comment_id,): (i64,) = sqlx::query_as(
        "INSERT INTO comments (post_id, author_id, content) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(post_id)
    .bind(author_id)
    .bind(content)
    .fetch_one(pool)
    .await?;

    sqlx::query("UPDATE posts SET total_comment = total_comment + 1 WHERE id = $1")
        .bind(post_id)
        .execute(pool)
        .await?;

    tracing::info!(post_id, comment_id, author_id, "Comment added");

    fetch_comment(pool, comment_id).await
}

/// Edits a comment; only its author may do so
pub async fn update_comment(
    pool: &PgPool,
    comment_id: i64,
    viewer_id: i64,
    content: &str,
) -> AppResult<CommentView> {
    if content.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Comment must not be empty".to_string(),
        ));
    }

    let (author_id, _) = comment_author_and_post(pool, comment_id).await?;
    if author_id != viewer_id {
        return Err(AppError::Forbidden(
            "Only the author may edit this comment".to_string(),
        ));
    }

    sqlx::query("UPDATE comments SET content = $2 WHERE id = $1")
        .bind(comment_id)
        .bind(content)
        .execute(pool)
        .await?;

    fetch_comment(pool, comment_id).await
}

/// Deletes a comment and decrements the post's comment counter
pub async fn delete_comment(pool: &PgPool, comment_id: i64, viewer_id: i64) -> AppResult<()> {
    let (author_id, post_id) = comment_author_and_post(pool, comment_id).await?;
    if author_id != viewer_id {
        return Err(AppError::Forbidden(
            "Only the author may delete this comment".to_string(),
        ));
    }

    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(pool)
        .await?;

    // Counters never go negative, even if they drifted
    sqlx::query("UPDATE posts SET total_comment = GREATEST(total_comment - 1, 0) WHERE id = $1")
        .bind(post_id)
        .execute(pool)
        .await?;

    tracing::info!(comment_id, post_id, viewer_id, "Comment deleted");

    Ok(())
}

/// Comments on a post, oldest first, paginated
pub async fn comments_for_post(
    pool: &PgPool,
    post_id: i64,
    page: u32,
) -> AppResult<Page<CommentView>> {
    post_author_id(pool, post_id).await?;

    let rows: Vec<CommentAuthorRow> = sqlx::query_as(
        r#"
        SELECT c.id, c.content, c.created_at,
               u.id AS author_id, u.username AS author_username,
               u.name AS author_name, u.avatar AS author_avatar
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = $1
        ORDER BY c.id
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;

    Ok(paginate(
        rows.into_iter().map(CommentView::from).collect(),
        page,
    ))
}

async fn comment_author_and_post(pool: &PgPool, comment_id: i64) -> AppResult<(i64, i64)> {
    let row: Option<(i64, i64)> =
        sqlx::query_as("SELECT author_id, post_id FROM comments WHERE id = $1")
            .bind(comment_id)
            .fetch_optional(pool)
            .await?;

    row.ok_or_else(|| AppError::NotFound("Comment does not exist".to_string()))
}

async fn fetch_comment(pool: &PgPool, comment_id: i64) -> AppResult<CommentView> {
    let row: Option<CommentAuthorRow> = sqlx::query_as(
        r#"
        SELECT c.id, c.content, c.created_at,
               u.id AS author_id, u.username AS author_username,
               u.name AS author_name, u.avatar AS author_avatar
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.id = $1
        "#,
    )
    .bind(comment_id)
    .fetch_optional(pool)
    .await?;

    row.map(CommentView::from)
        .ok_or_else(|| AppError::NotFound("Comment does not exist".to_string()))
}
