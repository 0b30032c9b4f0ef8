//! Timeout supervisor
//!
//! Watchdog that bounds how long an execution waits on the depth stream.
//! It polls the fill book once per tick and stops the subscription when the
//! order is complete or the tick budget is spent. It never touches fills and
//! never decides the final outcome; the engine recomputes that from the
//! book after the stream has closed.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::matching::FillBook;
use crate::source::StopHandle;

/// Why the supervisor stopped the subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorExit {
    Fulfilled,
    TimedOut,
}

pub struct TimeoutSupervisor {
    book: FillBook,
    stop: StopHandle,
    tick: Duration,
    timeout_ticks: u64,
}

impl TimeoutSupervisor {
    pub fn new(book: FillBook, stop: StopHandle, tick: Duration, timeout_ticks: u64) -> Self {
        Self {
            book,
            stop,
            tick,
            timeout_ticks,
        }
    }

    /// Poll until fulfilled or timed out, then stop the subscription once
    pub async fn run(self) -> SupervisorExit {
        let mut elapsed_ticks = 0u64;

        let exit = loop {
            if self.book.is_fulfilled() {
                break SupervisorExit::Fulfilled;
            }
            if elapsed_ticks >= self.timeout_ticks {
                break SupervisorExit::TimedOut;
            }
            tokio::time::sleep(self.tick).await;
            elapsed_ticks += 1;
        };

        if self.stop.stop() {
            info!(?exit, elapsed_ticks, "Supervisor stopped depth subscription");
        } else {
            debug!(?exit, elapsed_ticks, "Subscription was already stopped");
        }

        exit
    }

    pub fn spawn(self) -> JoinHandle<SupervisorExit> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use std::str::FromStr;
    use tokio::time::Instant;
    use types::depth::{DepthEvent, DepthLevel};
    use types::ids::Symbol;
    use types::numeric::{Price, Quantity};
    use types::order::LimitOrder;

    use crate::source::Subscription;

    const TICK: Duration = Duration::from_secs(1);

    fn book() -> FillBook {
        FillBook::new(
            LimitOrder::new(
                Symbol::new("BTCUSD").unwrap(),
                Quantity::from_str("1.0").unwrap(),
                Price::from_u64(100),
            )
            .unwrap(),
        )
    }

    fn filling_event() -> DepthEvent {
        DepthEvent {
            symbol: Symbol::new("BTCUSD").unwrap(),
            event_time: DateTime::from_timestamp_millis(0).unwrap(),
            first_update_id: 1,
            last_update_id: 1,
            bids: vec![DepthLevel::new("100", "1.0")],
            asks: vec![],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_after_budget() {
        let (subscription, delivery) = Subscription::channel();
        let start = Instant::now();

        let exit = TimeoutSupervisor::new(book(), subscription.stop.clone(), TICK, 5)
            .run()
            .await;

        assert_eq!(exit, SupervisorExit::TimedOut);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert!(delivery.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_stops_immediately() {
        let (subscription, delivery) = Subscription::channel();
        let start = Instant::now();

        let exit = TimeoutSupervisor::new(book(), subscription.stop.clone(), TICK, 0)
            .run()
            .await;

        assert_eq!(exit, SupervisorExit::TimedOut);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(delivery.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_fulfilled() {
        let (subscription, delivery) = Subscription::channel();
        let book = book();
        let handle = TimeoutSupervisor::new(book.clone(), subscription.stop.clone(), TICK, 30).spawn();

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        book.apply(&filling_event());

        let exit = handle.await.unwrap();
        assert_eq!(exit, SupervisorExit::Fulfilled);
        assert!(delivery.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_stopped_is_not_an_error() {
        let (subscription, _delivery) = Subscription::channel();
        subscription.stop.stop();

        let exit = TimeoutSupervisor::new(book(), subscription.stop.clone(), TICK, 1)
            .run()
            .await;

        assert_eq!(exit, SupervisorExit::TimedOut);
        assert!(subscription.stop.is_stopped());
    }
}
