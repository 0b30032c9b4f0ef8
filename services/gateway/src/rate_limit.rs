use crate::error::AppError;
use std::time::Instant;
use dashmap::DashMap;

/// Tracked symbols above which refilled buckets are dropped
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Clone)]
struct Bucket {
    capacity: u32,
    tokens: f64,
    refill_rate: f64,
    last_update: Instant,
}

impl Bucket {
    fn new(capacity: u32, refill_rate: f64) -> Self {
        Self {
            capacity,
            tokens: capacity as f64,
            refill_rate,
            last_update: Instant::now(),
        }
    }

    fn allow_request(&mut self, tokens: u32) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        // Refill tokens
        self.tokens = f64::min(
            self.capacity as f64,
            self.tokens + elapsed * self.refill_rate,
        );
        self.last_update = now;

        if self.tokens >= tokens as f64 {
            self.tokens -= tokens as f64;
            true
        } else {
            false
        }
    }

    /// A refilled bucket behaves exactly like a fresh one
    fn is_full(&self, now: Instant) -> bool {
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens + elapsed * self.refill_rate >= self.capacity as f64
    }
}

/// Per-symbol order throttle
///
/// Every execution opens its own exchange stream, so bursts on one symbol are
/// capped at `orders_per_minute` and refill evenly over the minute. Symbols
/// are client supplied, so once more than `PRUNE_THRESHOLD` are tracked the
/// buckets that have refilled are evicted.
pub struct RateLimiter {
    orders_per_minute: u32,
    // Keyed by symbol
    buckets: DashMap<String, Bucket>,
}

impl RateLimiter {
    pub fn new(orders_per_minute: u32) -> Self {
        Self {
            orders_per_minute,
            buckets: DashMap::new(),
        }
    }

    pub fn check_rate_limit(&self, symbol: &str) -> Result<(), AppError> {
        let capacity = self.orders_per_minute;
        let allowed = self
            .buckets
            .entry(symbol.to_string())
            .or_insert_with(|| Bucket::new(capacity, capacity as f64 / 60.0))
            .allow_request(1);

        // Entry guard must be dropped before `retain`
        if self.buckets.len() > PRUNE_THRESHOLD {
            self.prune_idle();
        }

        if allowed {
            Ok(())
        } else {
            Err(AppError::RateLimitExceeded(format!(
                "Too many orders for {}",
                symbol
            )))
        }
    }

    /// Drop every bucket that has refilled to capacity
    pub fn prune_idle(&self) {
        let now = Instant::now();
        self.buckets.retain(|_, bucket| !bucket.is_full(now));
    }

    pub fn tracked_symbols(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_up_to_capacity() {
        let limiter = RateLimiter::new(3);

        for _ in 0..3 {
            assert!(limiter.check_rate_limit("BTCUSDT").is_ok());
        }
        assert!(matches!(
            limiter.check_rate_limit("BTCUSDT"),
            Err(AppError::RateLimitExceeded(_))
        ));
    }

    #[test]
    fn test_symbols_are_independent() {
        let limiter = RateLimiter::new(1);

        assert!(limiter.check_rate_limit("BTCUSDT").is_ok());
        assert!(limiter.check_rate_limit("BTCUSDT").is_err());
        assert!(limiter.check_rate_limit("ETHUSDT").is_ok());
    }

    #[test]
    fn test_bucket_refills() {
        let mut bucket = Bucket::new(1, 60.0);
        assert!(bucket.allow_request(1));

        bucket.last_update -= std::time::Duration::from_secs(1);
        assert!(bucket.allow_request(1));
    }

    #[test]
    fn test_prune_keeps_draining_buckets() {
        let limiter = RateLimiter::new(60);
        limiter.check_rate_limit("BTCUSDT").unwrap();
        limiter.check_rate_limit("ETHUSDT").unwrap();

        limiter
            .buckets
            .get_mut("ETHUSDT")
            .unwrap()
            .last_update -= std::time::Duration::from_secs(5);
        limiter.prune_idle();

        assert_eq!(limiter.tracked_symbols(), 1);
        assert!(limiter.buckets.contains_key("BTCUSDT"));
    }

    #[test]
    fn test_tracked_symbols_stay_bounded() {
        let limiter = RateLimiter::new(60);
        for i in 0..PRUNE_THRESHOLD {
            limiter
                .buckets
                .insert(format!("SYM{i}"), Bucket::new(60, 1.0));
        }

        limiter.check_rate_limit("BTCUSDT").unwrap();

        assert_eq!(limiter.tracked_symbols(), 1);
        assert!(limiter.check_rate_limit("SYM0").is_ok());
    }
}
