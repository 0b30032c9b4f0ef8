//! Gateway configuration
//!
//! Every setting can be given as a flag or through the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use market_data::binance::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_WS_URL};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("orders per minute must be at least 1")]
    ZeroOrderRate,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "gateway", about = "Limit order fulfillment HTTP gateway")]
pub struct GatewayConfig {
    /// Port the HTTP server listens on
    #[arg(long, env = "HTTP_PORT", default_value_t = 8080)]
    pub http_port: u16,

    /// Supervisor tick budget for each order, in seconds
    #[arg(long, env = "ORDER_TIMEOUT_SECONDS")]
    pub order_timeout_seconds: u64,

    /// SQLite URL for fulfilled orders; persistence is off when unset
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(long, env = "MIGRATIONS_DIR", default_value = "./migrations")]
    pub migrations_dir: PathBuf,

    /// Base URL of the Binance raw stream endpoint
    #[arg(long, env = "BINANCE_WS_URL", default_value = DEFAULT_WS_URL)]
    pub binance_ws_url: String,

    /// Deadline for opening the exchange stream, in seconds
    #[arg(long, env = "BINANCE_CONNECT_TIMEOUT_SECONDS", default_value_t = DEFAULT_CONNECT_TIMEOUT.as_secs())]
    pub binance_connect_timeout_seconds: u64,

    /// Serve depth from a JSON-lines recording instead of Binance
    #[arg(long, env = "REPLAY_FILE")]
    pub replay_file: Option<PathBuf>,

    /// Per-symbol order throttle
    #[arg(long, env = "ORDERS_PER_MINUTE", default_value_t = 60)]
    pub orders_per_minute: u32,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.orders_per_minute == 0 {
            return Err(ConfigError::ZeroOrderRate);
        }
        Ok(())
    }

    pub fn binance_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.binance_connect_timeout_seconds)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.http_port))
    }
}
