use anyhow::Context;
use clap::Parser;
use gateway::{AppState, GatewayConfig, create_router};
use market_data::{BinanceDepthSource, BinanceSettings, ReplaySource};
use matching_engine::{DepthSource, MatchingEngine};
use persistence::Database;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::parse();
    config.validate()?;

    tracing::info!(
        timeout_secs = config.order_timeout_seconds,
        orders_per_minute = config.orders_per_minute,
        "Starting Gateway API service"
    );

    // Depth source: recording or live exchange
    let source: Arc<dyn DepthSource> = match &config.replay_file {
        Some(path) => {
            tracing::info!(path = %path.display(), "Serving depth from recording");
            Arc::new(ReplaySource::from_json_lines(path)?)
        }
        None => Arc::new(BinanceDepthSource::with_settings(BinanceSettings {
            ws_url: config.binance_ws_url.clone(),
            connect_timeout: config.binance_connect_timeout(),
        })),
    };

    let mut state = AppState::new(
        MatchingEngine::new(source),
        config.order_timeout_seconds,
        config.orders_per_minute,
    );

    match &config.database_url {
        Some(url) => {
            let db = Database::connect(url)
                .await
                .context("failed to open order database")?;
            db.run_migrations(&config.migrations_dir)
                .await
                .context("failed to migrate order database")?;
            state = state.with_database(db);
        }
        None => tracing::warn!("DATABASE_URL not set, fulfilled orders will not be stored"),
    }

    // Create router
    let app = create_router(state);

    // Bind and serve
    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
