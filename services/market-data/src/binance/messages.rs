//! Binance message types
//!
//! Types for deserializing Binance diff-depth websocket messages.

use serde::Deserialize;
use types::depth::DepthLevel;

/// Event type tag carried by diff-depth messages
pub const DEPTH_UPDATE_EVENT: &str = "depthUpdate";

/// Binance `<symbol>@depth` diff-depth message
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceDepthMessage {
    /// Event type, always `depthUpdate`
    #[serde(rename = "e")]
    pub event_type: String,

    /// Event time in milliseconds
    #[serde(rename = "E")]
    pub event_time: i64,

    /// Symbol in exchange format (e.g. `BNBBTC`)
    #[serde(rename = "s")]
    pub symbol: String,

    /// First update id in event
    #[serde(rename = "U")]
    pub first_update_id: u64,

    /// Final update id in event
    #[serde(rename = "u")]
    pub final_update_id: u64,

    /// Bids to be updated, `[price, quantity]`
    #[serde(rename = "b")]
    pub bids: Vec<DepthLevel>,

    /// Asks to be updated, `[price, quantity]`
    #[serde(rename = "a", default)]
    pub asks: Vec<DepthLevel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_depth_update() {
        let json = r#"{
            "e": "depthUpdate",
            "E": 1672515782136,
            "s": "BNBBTC",
            "U": 157,
            "u": 160,
            "b": [["0.0024", "10"]],
            "a": [["0.0026", "100"]]
        }"#;

        let msg: BinanceDepthMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.event_type, DEPTH_UPDATE_EVENT);
        assert_eq!(msg.event_time, 1672515782136);
        assert_eq!(msg.symbol, "BNBBTC");
        assert_eq!(msg.first_update_id, 157);
        assert_eq!(msg.final_update_id, 160);
        assert_eq!(msg.bids, vec![DepthLevel::new("0.0024", "10")]);
        assert_eq!(msg.asks, vec![DepthLevel::new("0.0026", "100")]);
    }

    #[test]
    fn test_subscription_ack_is_not_depth() {
        let json = r#"{"result": null, "id": 1}"#;
        assert!(serde_json::from_str::<BinanceDepthMessage>(json).is_err());
    }
}
