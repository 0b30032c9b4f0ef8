//! Market depth types
//!
//! Depth events carry price levels exactly as the exchange sent them
//! (decimal strings). Turning a level into a typed `Bid` is left to the
//! consumer so a malformed level can be skipped without rejecting the whole
//! event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::Symbol;
use crate::numeric::{Price, Quantity};

/// One raw `[price, quantity]` level from a depth update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel(pub String, pub String);

impl DepthLevel {
    pub fn new(price: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self(price.into(), quantity.into())
    }

    pub fn price(&self) -> &str {
        &self.0
    }

    pub fn quantity(&self) -> &str {
        &self.1
    }
}

/// A parsed bid level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bid {
    pub price: Price,
    pub quantity: Quantity,
}

/// One depth update for a symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthEvent {
    pub symbol: Symbol,
    pub event_time: DateTime<Utc>,
    /// First update id covered by this event
    pub first_update_id: u64,
    /// Last update id covered by this event, recorded on fills
    pub last_update_id: u64,
    pub bids: Vec<DepthLevel>,
    #[serde(default)]
    pub asks: Vec<DepthLevel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_level_from_wire_array() {
        let level: DepthLevel = serde_json::from_str(r#"["0.0024","10"]"#).unwrap();
        assert_eq!(level.price(), "0.0024");
        assert_eq!(level.quantity(), "10");
    }

    #[test]
    fn test_depth_event_roundtrip() {
        let event = DepthEvent {
            symbol: Symbol::new("BNBBTC").unwrap(),
            event_time: DateTime::from_timestamp_millis(1_672_515_782_136).unwrap(),
            first_update_id: 157,
            last_update_id: 160,
            bids: vec![DepthLevel::new("0.0024", "10")],
            asks: vec![],
        };

        let json = serde_json::to_string(&event).unwrap();
        let back: DepthEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
