//! Binance depth source
//!
//! Live diff-depth updates from the Binance websocket API.

mod client;
mod normalizer;
mod messages;

pub use client::{parse_depth_message, BinanceDepthSource, BinanceSettings, DEFAULT_CONNECT_TIMEOUT, DEFAULT_WS_URL};
pub use normalizer::BinanceNormalizer;
pub use messages::BinanceDepthMessage;
