use anyhow::Result;
use analytics_service::{
    api::{self, AppState},
    config::AppConfig,
    engine::AnalyticsEngine,
    metrics_server, observability,
    store::PgReadingStore,
};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    // Invalid tariff or pattern settings stop startup before any request is served.
    let engine = AnalyticsEngine::new(&cfg.engine)?;

    let pool = PgPoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .connect(&cfg.database.uri)
        .await?;

    let state = AppState {
        store: Arc::new(PgReadingStore::new(pool)),
        engine: Arc::new(engine),
    };

    let addr: SocketAddr = cfg
        .http
        .bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid http.bind_addr: {e}"))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "analytics API listening");

    axum::serve(listener, api::router(state).into_make_service()).await?;

    Ok(())
}
