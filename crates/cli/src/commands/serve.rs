//! `cortado serve` — run the HTTP server.
//!
//! Serving assumes the schema is already migrated; run `cortado migrate up`
//! first. The server itself never touches the migration runner.

use cortado_api::{db, router, AppState};
use cortado_core::AppConfig;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    let pool = db::connect(&config.database.url).await?;
    let app = router(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "cortado listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
}
