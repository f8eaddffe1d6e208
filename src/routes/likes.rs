use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::ViewerId,
    models::{Page, UserSummary},
    routes::AppState,
    services::likes,
};

#[derive(Debug, Serialize)]
pub struct LikeCountResponse {
    pub total_like: i64,
}

#[derive(Debug, Serialize)]
pub struct LikeCheckResponse {
    pub is_liked: bool,
}

/// Handler for liking a post
pub async fn like(
    State(state): State<Arc<AppState>>,
    viewer: ViewerId,
    Path(post_id): Path<i64>,
) -> AppResult<Json<LikeCountResponse>> {
    let total_like = likes::like_post(&state.db_pool, post_id, viewer.0).await?;
    Ok(Json(LikeCountResponse { total_like }))
}

/// Handler for removing a like
pub async fn unlike(
    State(state): State<Arc<AppState>>,
    viewer: ViewerId,
    Path(post_id): Path<i64>,
) -> AppResult<Json<LikeCountResponse>> {
    let total_like = likes::unlike_post(&state.db_pool, post_id, viewer.0).await?;
    Ok(Json(LikeCountResponse { total_like }))
}

/// Handler for the paginated likers list
pub async fn likers(
    State(state): State<Arc<AppState>>,
    Path((post_id, page)): Path<(i64, u32)>,
) -> AppResult<Json<Page<UserSummary>>> {
    let page = likes::likers(&state.db_pool, post_id, page).await?;
    Ok(Json(page))
}

/// Handler for checking whether a user liked a post
pub async fn check(
    State(state): State<Arc<AppState>>,
    Path((post_id, user_id)): Path<(i64, i64)>,
) -> AppResult<Json<LikeCheckResponse>> {
    let is_liked = likes::check_like(&state.db_pool, post_id, user_id).await?;
    Ok(Json(LikeCheckResponse { is_liked }))
}
