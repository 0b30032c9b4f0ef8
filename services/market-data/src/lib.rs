//! Market Data Service
//!
//! Depth event sources for the matching engine:
//! - Live Binance diff-depth websocket streams
//! - Replay of recorded depth events for offline runs and tests
//!
//! Both implement [`matching_engine::DepthSource`].
//!
//! # Architecture
//!
//! ```text
//!   Binance ws  ──┐
//!                 ├──▶ DepthEvent ──▶ DepthCallback ──▶ FillBook
//!   Recording   ──┘
//! ```

pub mod binance;
pub mod replay;

pub use binance::{BinanceDepthSource, BinanceSettings};
pub use replay::{ReplayEnd, ReplaySource};

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
