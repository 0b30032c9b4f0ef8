//! Gateway Service
//!
//! HTTP front end for one-shot limit orders: validates the request, runs it
//! through the matching engine against the exchange depth stream, and stores
//! fulfilled orders.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod rate_limit;
pub mod router;
pub mod state;

pub use config::GatewayConfig;
pub use router::create_router;
pub use state::AppState;
