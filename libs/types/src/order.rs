//! Limit order types
//!
//! A `LimitOrder` is the caller's fill target: take exactly `quantity` units
//! from bids priced at or above `price`.

use crate::errors::OrderError;
use crate::ids::Symbol;
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// A one-shot limit order
///
/// Fields are private so every instance has passed validation; the order is
/// never mutated once execution starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedLimitOrder")]
pub struct LimitOrder {
    symbol: Symbol,
    quantity: Quantity,
    price: Price,
}

impl LimitOrder {
    /// Create a new order
    ///
    /// Quantity and price must both be strictly positive.
    pub fn new(symbol: Symbol, quantity: Quantity, price: Price) -> Result<Self, OrderError> {
        if quantity.is_zero() {
            return Err(OrderError::InvalidQuantity(format!(
                "must be positive, got {quantity}"
            )));
        }
        if price.is_zero() {
            return Err(OrderError::InvalidPrice(format!(
                "must be positive, got {price}"
            )));
        }

        Ok(Self {
            symbol,
            quantity,
            price,
        })
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn price(&self) -> Price {
        self.price
    }
}

/// Wire form, validated through `LimitOrder::new`
#[derive(Deserialize)]
struct UncheckedLimitOrder {
    symbol: Symbol,
    quantity: Quantity,
    price: Price,
}

impl TryFrom<UncheckedLimitOrder> for LimitOrder {
    type Error = OrderError;

    fn try_from(raw: UncheckedLimitOrder) -> Result<Self, Self::Error> {
        LimitOrder::new(raw.symbol, raw.quantity, raw.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn symbol() -> Symbol {
        Symbol::new("BTCUSDT").unwrap()
    }

    #[test]
    fn test_order_creation() {
        let order = LimitOrder::new(
            symbol(),
            Quantity::from_str("1.0").unwrap(),
            Price::from_u64(100),
        )
        .unwrap();

        assert_eq!(order.symbol().as_str(), "BTCUSDT");
        assert_eq!(order.quantity(), Quantity::from_u64(1));
        assert_eq!(order.price(), Price::from_u64(100));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let err = LimitOrder::new(symbol(), Quantity::zero(), Price::from_u64(100)).unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity(_)));
    }

    #[test]
    fn test_zero_price_rejected() {
        let err = LimitOrder::new(symbol(), Quantity::from_u64(1), Price::from_u64(0)).unwrap_err();
        assert!(matches!(err, OrderError::InvalidPrice(_)));
    }

    #[test]
    fn test_order_serialization() {
        let order = LimitOrder::new(
            symbol(),
            Quantity::from_str("2.5").unwrap(),
            Price::from_str("3000.50").unwrap(),
        )
        .unwrap();

        let json = serde_json::to_string(&order).unwrap();
        let deserialized: LimitOrder = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
    }

    #[test]
    fn test_deserialization_validates() {
        let zero_qty = r#"{"symbol":"BTCUSDT","quantity":"0","price":"100"}"#;
        let err = serde_json::from_str::<LimitOrder>(zero_qty).unwrap_err();
        assert!(err.to_string().contains("Invalid quantity"), "{err}");

        let zero_price = r#"{"symbol":"BTCUSDT","quantity":"1","price":"0"}"#;
        assert!(serde_json::from_str::<LimitOrder>(zero_price).is_err());
    }
}
