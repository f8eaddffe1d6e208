use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::{RequestId, ViewerId},
    models::PostSummary,
    routes::AppState,
    services::feed,
};

#[derive(Debug, Serialize)]
pub struct NewsfeedResponse {
    pub posts: Vec<PostSummary>,
}

/// Handler for the newsfeed endpoint
pub async fn newsfeed(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    viewer: ViewerId,
    Path(limit): Path<i64>,
) -> AppResult<Json<NewsfeedResponse>> {
    if limit <= 0 {
        return Err(AppError::InvalidInput(
            "Limit must be a positive integer".to_string(),
        ));
    }

    tracing::info!(
        request_id = %request_id,
        viewer_id = %viewer,
        limit,
        "Processing newsfeed request"
    );

    let posts =
        feed::newsfeed_or_empty(state.feed_store.as_ref(), viewer.0, limit as usize).await?;

    Ok(Json(NewsfeedResponse { posts }))
}
