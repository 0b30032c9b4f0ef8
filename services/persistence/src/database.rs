//! SQLite store for fulfilled orders
//!
//! Every fulfilled order is written together with its splits (the fills that
//! completed it) in a single transaction.
//!
//! # Schema
//! ```text
//! fulfilled_orders        (id, symbol, quantity, price, created_at)
//! fulfilled_order_splits  (id, order_id → fulfilled_orders.id, update_id, quantity, price)
//! ```
//!
//! Decimals round-trip through TEXT columns so no precision is lost.

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use thiserror::Error;
use tracing::{debug, info};
use types::fill::Fill;
use types::ids::Symbol;
use types::numeric::{Price, Quantity};
use types::order::LimitOrder;

const MAX_CONNECTIONS: u32 = 5;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] MigrateError),

    #[error("update id {0} does not fit the store")]
    UpdateIdOutOfRange(u64),

    #[error("corrupt value in column {column}: {value:?}")]
    Corrupt { column: &'static str, value: String },
}

// ── Records ─────────────────────────────────────────────────────────

/// A fulfilled order as read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct FulfilledOrder {
    pub id: i64,
    pub symbol: Symbol,
    pub quantity: Quantity,
    pub price: Price,
    pub created_at: DateTime<Utc>,
    /// Splits in insertion order
    pub splits: Vec<Fill>,
}

// ── Database ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a pool for `url` (e.g. `sqlite://orders.db`), creating the file
    /// if it does not exist
    pub async fn connect(url: &str) -> Result<Self, PersistenceError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        info!(url, "Connected to order database");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply every pending migration found in `dir`
    pub async fn run_migrations(&self, dir: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let dir = dir.as_ref();
        let migrator = Migrator::new(dir).await?;
        migrator.run(&self.pool).await?;

        info!(dir = %dir.display(), "Database migrations applied");
        Ok(())
    }

    /// Store a fulfilled order and its splits atomically, returning the new
    /// order id
    ///
    /// Nothing is written unless every row is.
    pub async fn persist_fulfilled_order(
        &self,
        order: &LimitOrder,
        fills: &[Fill],
    ) -> Result<i64, PersistenceError> {
        let mut tx = self.pool.begin().await?;

        let order_id = sqlx::query(
            "INSERT INTO fulfilled_orders (symbol, quantity, price, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(order.symbol().as_str())
        .bind(order.quantity().to_string())
        .bind(order.price().to_string())
        .bind(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for fill in fills {
            let update_id = i64::try_from(fill.source_update_id)
                .map_err(|_| PersistenceError::UpdateIdOutOfRange(fill.source_update_id))?;

            sqlx::query(
                "INSERT INTO fulfilled_order_splits (order_id, update_id, quantity, price) VALUES (?, ?, ?, ?)",
            )
            .bind(order_id)
            .bind(update_id)
            .bind(fill.quantity.to_string())
            .bind(fill.price.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            order_id,
            symbol = %order.symbol(),
            splits = fills.len(),
            "Persisted fulfilled order"
        );
        Ok(order_id)
    }

    /// Load one fulfilled order with its splits
    pub async fn fulfilled_order(&self, id: i64) -> Result<Option<FulfilledOrder>, PersistenceError> {
        let Some(row) = sqlx::query(
            "SELECT id, symbol, quantity, price, created_at FROM fulfilled_orders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            debug!(id, "Fulfilled order not found");
            return Ok(None);
        };

        let split_rows = sqlx::query(
            "SELECT update_id, quantity, price FROM fulfilled_order_splits WHERE order_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let splits = split_rows
            .iter()
            .map(split_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let symbol: String = row.try_get("symbol")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Some(FulfilledOrder {
            id: row.try_get("id")?,
            symbol: Symbol::new(symbol.as_str()).map_err(|_| corrupt("symbol", symbol))?,
            quantity: decode(&row, "quantity")?,
            price: decode(&row, "price")?,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map_err(|_| corrupt("created_at", created_at))?
                .with_timezone(&Utc),
            splits,
        }))
    }
}

fn split_from_row(row: &SqliteRow) -> Result<Fill, PersistenceError> {
    let update_id: i64 = row.try_get("update_id")?;
    let update_id =
        u64::try_from(update_id).map_err(|_| corrupt("update_id", update_id.to_string()))?;

    Ok(Fill::new(update_id, decode(row, "price")?, decode(row, "quantity")?))
}

/// Parse a TEXT decimal column
fn decode<T: FromStr>(row: &SqliteRow, column: &'static str) -> Result<T, PersistenceError> {
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|_| corrupt(column, raw))
}

fn corrupt(column: &'static str, value: String) -> PersistenceError {
    PersistenceError::Corrupt { column, value }
}
