//! Fill (order split) types
//!
//! A fulfilled order is made of one or more fills, each a quantity slice
//! taken from a single acceptable bid.

use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// A quantity slice taken from one accepted bid
///
/// Serialized names match the public API: `update_id`, `bid_price`,
/// `bid_quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    /// Update id of the depth event the bid arrived in
    #[serde(rename = "update_id")]
    pub source_update_id: u64,
    #[serde(rename = "bid_price")]
    pub price: Price,
    /// Quantity taken, which may be less than the bid offered
    #[serde(rename = "bid_quantity")]
    pub quantity: Quantity,
}

impl Fill {
    pub fn new(source_update_id: u64, price: Price, quantity: Quantity) -> Self {
        Self {
            source_update_id,
            price,
            quantity,
        }
    }
}

/// Total quantity across a set of fills
pub fn total_quantity(fills: &[Fill]) -> Quantity {
    fills.iter().map(|f| f.quantity).sum()
}
