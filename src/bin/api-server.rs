//! Mooviz API Server
//!
//! Serves the screener, treemap and candlestick payloads over HTTP.
//! Single process; the snapshot cache lives in memory.

use dotenvy::dotenv;
use mooviz::config::Config;
use mooviz::core::http::start_server;
use mooviz::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    let config = Config::from_env()?;
    logging::init_logging(&config.environment);

    info!("Starting Mooviz API Server");
    info!(environment = %config.environment, "Environment");
    info!(port = config.port, "HTTP Server: http://0.0.0.0:{}", config.port);
    info!(
        symbols = config.symbols.len(),
        ttl_secs = config.cache_ttl.as_secs(),
        rsi_period = config.rsi_period,
        "Default screen: {} symbols, cache TTL {}s",
        config.symbols.len(),
        config.cache_ttl.as_secs()
    );

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(config).await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("API server started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
