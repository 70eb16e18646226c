use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use session_service::config::CacheBackendKind;
use session_service::config::Config;
use session_service::domain::session::service::SessionService;
use session_service::inbound::http::router::create_router;
use session_service::outbound::cache::CacheBackend;
use session_service::outbound::cache::InMemoryCache;
use session_service::outbound::cache::RedisCache;
use session_service::outbound::repositories::PostgresAccountRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "session-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        cache_backend = ?config.cache.backend,
        jwt_algorithm = ?config.jwt.algorithm,
        access_ttl_seconds = config.jwt.access.ttl_seconds,
        refresh_ttl_seconds = config.jwt.refresh.ttl_seconds,
        refresh_requires_current_session = config.session.refresh_requires_current_session,
        "Configuration loaded"
    );

    // Fails fast on unusable TTLs or key material
    let codec = Arc::new(config.jwt.codec()?);
    let settings = config.session_settings()?;

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let cache = match config.cache.backend {
        CacheBackendKind::Redis => {
            let url = config
                .cache
                .url
                .as_deref()
                .context("cache.url is required for the redis backend")?;
            CacheBackend::Redis(RedisCache::connect(url).await?)
        }
        CacheBackendKind::Memory => {
            tracing::warn!("In-memory cache selected; sessions are not shared between instances");
            let cache = InMemoryCache::new();
            let sweeper = cache.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(60));
                loop {
                    interval.tick().await;
                    let purged = sweeper.purge_expired().await;
                    if purged > 0 {
                        tracing::debug!(purged, "Expired cache entries purged");
                    }
                }
            });
            CacheBackend::Memory(cache)
        }
    };
    tracing::info!(cache = cache.name(), "Session store ready");

    let account_repository = Arc::new(PostgresAccountRepository::new(pg_pool));
    let session_service = Arc::new(SessionService::new(
        account_repository,
        Arc::new(cache),
        codec,
        settings,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(session_service)).await?;

    tracing::info!("Server exited successfully");
    Ok(())
}
