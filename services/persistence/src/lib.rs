//! Persistence Service
//!
//! Durable record of fulfilled limit orders and their splits, backed by
//! SQLite through `sqlx`.

pub mod database;

pub use database::{Database, FulfilledOrder, PersistenceError};

/// Migrations shipped with this crate
pub const MIGRATIONS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/migrations");
