//! Binance message normalizer
//!
//! Converts Binance diff-depth messages to `DepthEvent`.

use chrono::DateTime;
use matching_engine::SourceError;
use types::depth::DepthEvent;
use types::ids::Symbol;

use super::messages::{BinanceDepthMessage, DEPTH_UPDATE_EVENT};

/// Normalizer for Binance depth data
///
/// Price levels are passed through untouched; malformed levels are the
/// matching engine's concern and are skipped there one by one.
#[derive(Debug, Default)]
pub struct BinanceNormalizer;

impl BinanceNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a Binance depth message to a `DepthEvent`
    pub fn normalize(&self, msg: BinanceDepthMessage) -> Result<DepthEvent, SourceError> {
        if msg.event_type != DEPTH_UPDATE_EVENT {
            return Err(SourceError::Protocol(format!(
                "unexpected event type '{}'",
                msg.event_type
            )));
        }

        let event_time = DateTime::from_timestamp_millis(msg.event_time).ok_or_else(|| {
            SourceError::Protocol(format!("invalid event time {}", msg.event_time))
        })?;

        let symbol = Symbol::new(&msg.symbol)
            .map_err(|e| SourceError::Protocol(format!("invalid symbol: {e}")))?;

        Ok(DepthEvent {
            symbol,
            event_time,
            first_update_id: msg.first_update_id,
            last_update_id: msg.final_update_id,
            bids: msg.bids,
            asks: msg.asks,
        })
    }
}
