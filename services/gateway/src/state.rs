use crate::rate_limit::RateLimiter;
use matching_engine::MatchingEngine;
use persistence::Database;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MatchingEngine>,
    /// Fulfilled orders are only stored when a database is configured
    pub database: Option<Database>,
    pub order_timeout_secs: u64,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(engine: MatchingEngine, order_timeout_secs: u64, orders_per_minute: u32) -> Self {
        Self {
            engine: Arc::new(engine),
            database: None,
            order_timeout_secs,
            rate_limiter: Arc::new(RateLimiter::new(orders_per_minute)),
        }
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }
}
