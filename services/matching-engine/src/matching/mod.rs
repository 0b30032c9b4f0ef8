//! Matching logic module
//!
//! Evaluates depth events against a limit order and accumulates fills

pub mod book;
pub mod fill;

pub use book::{BookSnapshot, FillBook};
pub use fill::{apply_event, is_acceptable, is_fulfilled, quantity_to_take, remaining_quantity};
