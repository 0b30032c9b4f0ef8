//! Error types shared across the services
//!
//! Comprehensive error taxonomy using thiserror

use thiserror::Error;

/// Numeric parsing and range errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericError {
    #[error("Cannot parse {input:?} as a decimal: {reason}")]
    Parse { input: String, reason: String },

    #[error("Value must not be negative: {0}")]
    Negative(String),

    #[error("Value is not finite: {0}")]
    NonFinite(String),
}

/// Order-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderError {
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),
}
