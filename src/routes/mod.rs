use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Cache;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};
use crate::services::store::FeedStore;

pub mod comments;
pub mod favorites;
pub mod feed;
pub mod follows;
pub mod likes;
pub mod posts;

/// Shared application state
pub struct AppState {
    pub db_pool: PgPool,
    pub cache: Cache,
    pub feed_store: Arc<dyn FeedStore>,
    pub search_cache_ttl: u64,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Newsfeed
        .route("/newsfeed/:limit", get(feed::newsfeed))
        // Posts
        .route("/posts", post(posts::create))
        .route(
            "/posts/:post_id",
            get(posts::open).put(posts::update).delete(posts::remove),
        )
        .route("/profile/posts/:user_id", get(posts::by_user))
        .route("/search/post/:query/:page", get(posts::search))
        .route("/search/all/:query", get(posts::search_all))
        // Likes
        .route("/like/:post_id", post(likes::like).delete(likes::unlike))
        .route("/like/:post_id/:page", get(likes::likers))
        .route("/like/check/:post_id/:user_id", get(likes::check))
        // Comments; the bare id is a post id on POST and a comment id otherwise
        .route(
            "/comment/:id",
            post(comments::create)
                .put(comments::update)
                .delete(comments::remove),
        )
        .route("/comment/:id/:page", get(comments::list))
        // Follows
        .route(
            "/follow/:user_id",
            post(follows::follow).delete(follows::unfollow),
        )
        .route("/follow/check/:target_id/:user_id", get(follows::check))
        .route("/followers/:user_id", get(follows::followers))
        .route("/following/:user_id", get(follows::following))
        // Favorites; the id is a post id on POST/DELETE and a page number on GET
        .route(
            "/favorites/:id",
            post(favorites::add).delete(favorites::remove).get(favorites::list),
        )
        // Outermost to innermost: CORS, request-id, trace. The request-id
        // middleware must run before the trace span is created so the span
        // can pick the id up from the request extensions.
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
