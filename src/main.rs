use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use circle_api::config::Config;
use circle_api::db::{self, Cache};
use circle_api::routes::{create_router, AppState};
use circle_api::services::store::PgFeedStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Database
    let db_pool = db::create_pool(&config.database_url).await?;
    sqlx::migrate!().run(&db_pool).await?;
    tracing::info!("Database pool ready");

    // Cache
    let redis_client = db::create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client).await;

    let feed_store = Arc::new(PgFeedStore::new(db_pool.clone()));

    let state = Arc::new(AppState {
        db_pool,
        cache,
        feed_store,
        search_cache_ttl: config.search_cache_ttl,
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    cache_writer.shutdown().await;

    Ok(())
}
