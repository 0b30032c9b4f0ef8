//! Types library for the limit order fulfillment services
//!
//! This library provides the domain types shared by the matching engine,
//! market data, persistence and gateway services.
//!
//! # Modules
//! - `ids`: Identifiers (Symbol, ExecutionId)
//! - `numeric`: Fixed-point decimal types (Price, Quantity)
//! - `order`: Limit order type
//! - `fill`: Fill (order split) type
//! - `depth`: Depth update events and bid levels
//! - `errors`: Error taxonomy

pub mod ids;
pub mod numeric;
pub mod order;
pub mod fill;
pub mod depth;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::fill::*;
    pub use crate::depth::*;
    pub use crate::errors::*;
}
