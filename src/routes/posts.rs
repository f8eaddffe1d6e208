use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::ViewerId,
    models::{CreatePostRequest, Page, PostDetail, PostSummary, UpdatePostRequest},
    routes::AppState,
    services::posts,
};

/// Handler for post creation
pub async fn create(
    State(state): State<Arc<AppState>>,
    viewer: ViewerId,
    Json(request): Json<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<PostDetail>)> {
    let post = posts::create_post(&state.db_pool, viewer.0, request).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// Handler for opening a post; bumps its view counter
pub async fn open(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
) -> AppResult<Json<PostDetail>> {
    let post = posts::open_post(&state.db_pool, post_id).await?;
    Ok(Json(post))
}

/// Handler for editing a post
pub async fn update(
    State(state): State<Arc<AppState>>,
    viewer: ViewerId,
    Path(post_id): Path<i64>,
    Json(request): Json<UpdatePostRequest>,
) -> AppResult<Json<PostDetail>> {
    let post = posts::update_post(&state.db_pool, post_id, viewer.0, request).await?;
    Ok(Json(post))
}

/// Handler for deleting a post
pub async fn remove(
    State(state): State<Arc<AppState>>,
    viewer: ViewerId,
    Path(post_id): Path<i64>,
) -> AppResult<StatusCode> {
    posts::delete_post(&state.db_pool, post_id, viewer.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for listing a user's posts
pub async fn by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<PostDetail>>> {
    let posts = posts::posts_by_user(&state.db_pool, user_id).await?;
    Ok(Json(posts))
}

/// Handler for paginated post search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Path((query, page)): Path<(String, u32)>,
) -> AppResult<Json<Page<PostSummary>>> {
    let results = posts::search_posts(
        &state.db_pool,
        &state.cache,
        state.search_cache_ttl,
        &query,
        page,
    )
    .await?;
    Ok(Json(results))
}

/// Handler for combined post + user search
pub async fn search_all(
    State(state): State<Arc<AppState>>,
    Path(query): Path<String>,
) -> AppResult<Json<posts::SearchResults>> {
    let results = posts::search_all(
        &state.db_pool,
        &state.cache,
        state.search_cache_ttl,
        &query,
    )
    .await?;
    Ok(Json(results))
}
