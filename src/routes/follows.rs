use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::ViewerId,
    models::UserSummary,
    routes::AppState,
    services::follows,
};

#[derive(Debug, Serialize)]
pub struct FollowersResponse {
    pub followers: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct FollowingResponse {
    pub following: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct FollowCheckResponse {
    pub is_followed: bool,
}

/// Handler for following a user
pub async fn follow(
    State(state): State<Arc<AppState>>,
    viewer: ViewerId,
    Path(user_id): Path<i64>,
) -> AppResult<StatusCode> {
    follows::follow_user(&state.db_pool, viewer.0, user_id).await?;
    Ok(StatusCode::OK)
}

/// Handler for unfollowing a user
pub async fn unfollow(
    State(state): State<Arc<AppState>>,
    viewer: ViewerId,
    Path(user_id): Path<i64>,
) -> AppResult<StatusCode> {
    follows::unfollow_user(&state.db_pool, viewer.0, user_id).await?;
    Ok(StatusCode::OK)
}

/// Handler for a user's followers list
pub async fn followers(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<FollowersResponse>> {
    let followers = follows::followers(&state.db_pool, user_id).await?;
    Ok(Json(FollowersResponse { followers }))
}

/// Handler for a user's following list
pub async fn following(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<FollowingResponse>> {
    let following = follows::following(&state.db_pool, user_id).await?;
    Ok(Json(FollowingResponse { following }))
}

/// Handler for checking whether a user follows another
pub async fn check(
    State(state): State<Arc<AppState>>,
    Path((target_id, user_id)): Path<(i64, i64)>,
) -> AppResult<Json<FollowCheckResponse>> {
    let is_followed = follows::is_following(&state.db_pool, user_id, target_id).await?;
    Ok(Json(FollowCheckResponse { is_followed }))
}
