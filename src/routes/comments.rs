use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::ViewerId,
    models::{CommentView, CreateCommentRequest, Page},
    routes::AppState,
    services::comments,
};

/// Handler for commenting on a post
pub async fn create(
    State(state): State<Arc<AppState>>,
    viewer: ViewerId,
    Path(post_id): Path<i64>,
    Json(request): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<CommentView>)> {
    let comment =
        comments::add_comment(&state.db_pool, post_id, viewer.0, &request.content).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Handler for editing a comment
pub async fn update(
    State(state): State<Arc<AppState>>,
    viewer: ViewerId,
    Path(comment_id): Path<i64>,
    Json(request): Json<CreateCommentRequest>,
) -> AppResult<Json<CommentView>> {
    let comment =
        comments::update_comment(&state.db_pool, comment_id, viewer.0, &request.content).await?;
    Ok(Json(comment))
}

/// Handler for deleting a comment
pub async fn remove(
    State(state): State<Arc<AppState>>,
    viewer: ViewerId,
    Path(comment_id): Path<i64>,
) -> AppResult<StatusCode> {
    comments::delete_comment(&state.db_pool, comment_id, viewer.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for the paginated comment list of a post
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path((post_id, page)): Path<(i64, u32)>,
) -> AppResult<Json<Page<CommentView>>> {
    let page = comments::comments_for_post(&state.db_pool, post_id, page).await?;
    Ok(Json(page))
}
