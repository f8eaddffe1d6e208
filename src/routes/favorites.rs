use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::ViewerId,
    models::{Page, PostSummary},
    routes::AppState,
    services::favorites,
};

/// Handler for bookmarking a post
pub async fn add(
    State(state): State<Arc<AppState>>,
    viewer: ViewerId,
    Path(post_id): Path<i64>,
) -> AppResult<StatusCode> {
    favorites::add_favorite(&state.db_pool, viewer.0, post_id).await?;
    Ok(StatusCode::CREATED)
}

/// Handler for removing a bookmark
pub async fn remove(
    State(state): State<Arc<AppState>>,
    viewer: ViewerId,
    Path(post_id): Path<i64>,
) -> AppResult<StatusCode> {
    favorites::remove_favorite(&state.db_pool, viewer.0, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for the viewer's paginated favorites; the path id is the page
pub async fn list(
    State(state): State<Arc<AppState>>,
    viewer: ViewerId,
    Path(page): Path<u32>,
) -> AppResult<Json<Page<PostSummary>>> {
    let page = favorites::favorites_page(&state.db_pool, viewer.0, page).await?;
    Ok(Json(page))
}
