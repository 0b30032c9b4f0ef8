use serde::{Deserialize, Serialize};
use types::fill::Fill;
use types::ids::Symbol;
use types::numeric::{Price, Quantity};
use types::order::LimitOrder;

use crate::error::AppError;

pub const FULFILLED_MESSAGE: &str = "Order successfully fulfilled";

/// `POST /order/limit` body
#[derive(Debug, Clone, Deserialize)]
pub struct LimitOrderRequest {
    pub symbol: String,
    pub order_size: f64,
    pub price: f64,
}

impl LimitOrderRequest {
    /// Validate into a domain order
    pub fn into_order(self) -> Result<LimitOrder, AppError> {
        let bad_request = |e: &dyn std::fmt::Display| AppError::BadRequest(e.to_string());

        let symbol = Symbol::new(self.symbol).map_err(|e| bad_request(&e))?;
        let quantity = Quantity::from_f64(self.order_size).map_err(|e| bad_request(&e))?;
        let price = Price::from_f64(self.price).map_err(|e| bad_request(&e))?;

        LimitOrder::new(symbol, quantity, price).map_err(|e| bad_request(&e))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderFulfilledResponse {
    pub message: String,
    /// Id of the stored order; absent when persistence is disabled
    pub order_id: Option<i64>,
    pub data: Vec<Fill>,
}

impl OrderFulfilledResponse {
    pub fn new(order_id: Option<i64>, fills: Vec<Fill>) -> Self {
        Self {
            message: FULFILLED_MESSAGE.to_string(),
            order_id,
            data: fills,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
