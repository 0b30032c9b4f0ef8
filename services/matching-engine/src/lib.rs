//! Matching Engine Service
//!
//! Fills one-shot limit orders from a live market depth stream. Each
//! execution subscribes to the order's symbol, takes quantity from bids at or
//! above the limit price until the order is complete, and gives up after a
//! tick budget.
//!
//! **Key Invariants:**
//! - Filled quantity never exceeds the order quantity
//! - No fill is priced below the limit
//! - Nothing is appended once the order is complete
//! - Exactly one subscription and at most one supervisor per execution,
//!   both torn down before `execute` returns

pub mod matching;
pub mod source;
pub mod supervisor;
pub mod engine;

pub use engine::{ExecutionError, ExecutionOutcome, MatchingEngine, DEFAULT_TICK};
pub use source::{DepthSource, SourceError, StopHandle, Subscription};
