use sqlx::PgPool;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        paginate, CreatePostRequest, Page, PostAuthorRow, PostDetail, PostSummary,
        UpdatePostRequest, UserProfile,
    },
};
use serde::{Deserialize, Serialize};

/// Combined result of the global search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub posts: Vec<PostSummary>,
    pub users: Vec<UserProfile>,
}

const POST_WITH_AUTHOR: &str = r#"
    SELECT p.id, p.title, p.description, p.steps, p.main_image,
           p.total_like, p.total_comment, p.total_view,
           p.created_at, p.updated_at,
           u.id AS author_id, u.username AS author_username,
           u.name AS author_name, u.avatar AS author_avatar
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

/// Fails with `NotFound` unless the user row exists
pub(crate) async fn ensure_user_exists(pool: &PgPool, user_id: i64) -> AppResult<()> {
    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    exists
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("User does not exist".to_string()))
}

/// Returns the author id of a post, or `NotFound`
pub(crate) async fn post_author_id(pool: &PgPool, post_id: i64) -> AppResult<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT author_id FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(pool)
        .await?;

    row.map(|(id,)| id)
        .ok_or_else(|| AppError::NotFound("Post does not exist".to_string()))
}

async fn fetch_post_detail(pool: &PgPool, post_id: i64) -> AppResult<PostDetail> {
    let row: Option<PostAuthorRow> =
        sqlx::query_as(&format!("{} WHERE p.id = $1", POST_WITH_AUTHOR))
            .bind(post_id)
            .fetch_optional(pool)
            .await?;

    row.map(PostDetail::from)
        .ok_or_else(|| AppError::NotFound("Post does not exist".to_string()))
}

/// Creates a post for the authenticated author
pub async fn create_post(
    pool: &PgPool,
    author_id: i64,
    request: CreatePostRequest,
) -> AppResult<PostDetail> {
    if request.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title must not be empty".to_string()));
    }

    ensure_user_exists(pool, author_id).await?;

    let (post_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO posts (author_id, title, description, steps, main_image)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(author_id)
    .bind(&request.title)
    .bind(&request.description)
    .bind(&request.steps)
    .bind(&request.main_image)
    .fetch_one(pool)
    .await?;

    tracing::info!(post_id, author_id, "Post created");

    fetch_post_detail(pool, post_id).await
}

/// Updates a post; only the author may edit it
pub async fn update_post(
    pool: &PgPool,
    post_id: i64,
    viewer_id: i64,
    request: UpdatePostRequest,
) -> AppResult<PostDetail> {
    let author_id = post_author_id(pool, post_id).await?;
    if author_id != viewer_id {
        return Err(AppError::Forbidden(
            "Only the author may edit this post".to_string(),
        ));
    }

    sqlx::query(
        r#"
        UPDATE posts
        SET title = COALESCE($2, title),
            description = COALESCE($3, description),
            steps = COALESCE($4, steps),
            main_image = COALESCE($5, main_image),
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .bind(&request.title)
    .bind(&request.description)
    .bind(&request.steps)
    .bind(&request.main_image)
    .execute(pool)
    .await?;

    fetch_post_detail(pool, post_id).await
}

/// Deletes a post; only the author may remove it
pub async fn delete_post(pool: &PgPool, post_id: i64, viewer_id: i64) -> AppResult<()> {
    let author_id = post_author_id(pool, post_id).await?;
    if author_id != viewer_id {
        return Err(AppError::Forbidden(
            "Only the author may delete this post".to_string(),
        ));
    }

    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(pool)
        .await?;

    tracing::info!(post_id, viewer_id, "Post deleted");

    Ok(())
}

/// Opens a post: bumps its view counter and returns the detail view
pub async fn open_post(pool: &PgPool, post_id: i64) -> AppResult<PostDetail> {
    let updated = sqlx::query("UPDATE posts SET total_view = total_view + 1 WHERE id = $1")
        .bind(post_id)
        .execute(pool)
        .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound("Post does not exist".to_string()));
    }

    fetch_post_detail(pool, post_id).await
}

/// All posts authored by one user, newest first
pub async fn posts_by_user(pool: &PgPool, user_id: i64) -> AppResult<Vec<PostDetail>> {
    let rows: Vec<PostAuthorRow> = sqlx::query_as(&format!(
        "{} WHERE p.author_id = $1 ORDER BY p.created_at DESC",
        POST_WITH_AUTHOR
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(PostDetail::from).collect())
}

/// Substring search over post titles and descriptions, paginated
///
/// Pages are cached read-through with a short TTL; a slightly stale search
/// page is acceptable, a slow one is not.
pub async fn search_posts(
    pool: &PgPool,
    cache: &Cache,
    cache_ttl: u64,
    query: &str,
    page: u32,
) -> AppResult<Page<PostSummary>> {
    let key = CacheKey::PostSearch(query.to_string(), page);
    let pattern = format!("%{}%", query);

    cached!(cache, key, cache_ttl, async {
        let rows: Vec<PostAuthorRow> = sqlx::query_as(&format!(
            "{} WHERE p.title LIKE $1 OR p.description LIKE $1 ORDER BY p.id",
            POST_WITH_AUTHOR
        ))
        .bind(&pattern)
        .fetch_all(pool)
        .await?;

        Ok::<_, AppError>(paginate(
            rows.into_iter().map(PostSummary::from).collect(),
            page,
        ))
    })
}

/// Top-10 posts and top-10 users matching a query
pub async fn search_all(
    pool: &PgPool,
    cache: &Cache,
    cache_ttl: u64,
    query: &str,
) -> AppResult<SearchResults> {
    let key = CacheKey::GlobalSearch(query.to_string());
    let pattern = format!("%{}%", query);

    cached!(cache, key, cache_ttl, async {
        let posts: Vec<PostAuthorRow> = sqlx::query_as(&format!(
            "{} WHERE p.title LIKE $1 OR p.description LIKE $1 ORDER BY p.id LIMIT 10",
            POST_WITH_AUTHOR
        ))
        .bind(&pattern)
        .fetch_all(pool)
        .await?;

        let users: Vec<UserProfile> = sqlx::query_as(
            r#"
            SELECT id, username, name, avatar, bio, total_followers, total_following
            FROM users
            WHERE username LIKE $1 OR name LIKE $1
            ORDER BY id
            LIMIT 10
            "#,
        )
        .bind(&pattern)
        .fetch_all(pool)
        .await?;

        Ok::<_, AppError>(SearchResults {
            posts: posts.into_iter().map(PostSummary::from).collect(),
            users,
        })
    })
}
