use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use cinechat_api::{
    config::Config,
    db::{create_pool, create_redis_client, Cache, PgStore},
    routes::{create_router, AppState},
    services::providers::tmdb::TmdbProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("Database migrations applied");

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, _cache_writer) = Cache::new(redis_client);

    let provider = Arc::new(TmdbProvider::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_region.clone(),
    ));

    let store = Arc::new(PgStore::new(pool));
    let state = Arc::new(AppState::new(
        store.clone(),
        store,
        provider,
        config.feed_limit,
    ));

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
