//! Matching engine core
//!
//! Runs one limit order against a live depth stream: subscribes, feeds every
//! event through the fill book, races completion against the timeout
//! supervisor, and reports whatever was accumulated once the stream closes.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};
use types::depth::DepthEvent;
use types::fill::{total_quantity, Fill};
use types::ids::ExecutionId;
use types::numeric::Quantity;
use types::order::LimitOrder;

use crate::matching::FillBook;
use crate::source::{DepthCallback, DepthSource, ErrorCallback, SourceError, Subscription};
use crate::supervisor::TimeoutSupervisor;

/// Length of one supervisor poll in production
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Execution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// The depth subscription could not be opened; nothing was executed
    #[error("could not open depth subscription: {0}")]
    SubscriptionOpen(#[source] SourceError),

    /// The stream failed after opening; fills up to that point are kept
    #[error("depth subscription failed: {0}")]
    SubscriptionRuntime(#[source] SourceError),
}

/// Result of one execution
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    pub fills: Vec<Fill>,
    pub fulfilled: bool,
    pub error: Option<ExecutionError>,
}

impl ExecutionOutcome {
    fn open_failed(error: SourceError) -> Self {
        Self {
            fills: Vec::new(),
            fulfilled: false,
            error: Some(ExecutionError::SubscriptionOpen(error)),
        }
    }

    pub fn filled_quantity(&self) -> Quantity {
        total_quantity(&self.fills)
    }
}

/// Main matching engine
///
/// Stateless between calls; every `execute` builds its own fill book,
/// subscription and supervisor.
pub struct MatchingEngine {
    source: Arc<dyn DepthSource>,
    tick: Duration,
}

impl MatchingEngine {
    pub fn new(source: Arc<dyn DepthSource>) -> Self {
        Self {
            source,
            tick: DEFAULT_TICK,
        }
    }

    /// Override the supervisor poll interval
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Try to fill `order` from the depth stream within `timeout_secs` ticks
    ///
    /// Blocks until the subscription has closed. The subscription is stopped
    /// and the supervisor joined on every return path.
    #[instrument(
        name = "execute",
        skip_all,
        fields(
            execution_id = %ExecutionId::new(),
            symbol = %order.symbol(),
            quantity = %order.quantity(),
            price = %order.price(),
        )
    )]
    pub async fn execute(&self, order: LimitOrder, timeout_secs: u64) -> ExecutionOutcome {
        let book = FillBook::new(order.clone());

        let on_event: DepthCallback = {
            let book = book.clone();
            Arc::new(move |event: DepthEvent| {
                book.apply(&event);
            })
        };
        let on_error: ErrorCallback = {
            let book = book.clone();
            Arc::new(move |err: SourceError| {
                warn!(error = %err, "Depth stream reported an error");
                book.record_error(err);
            })
        };

        let Subscription { stop, completion } =
            match self.source.subscribe(order.symbol(), on_event, on_error).await {
                Ok(subscription) => subscription,
                Err(err) => {
                    error!(error = %err, "Failed to open depth subscription");
                    return ExecutionOutcome::open_failed(err);
                }
            };

        info!(timeout_secs, "Depth subscription open");

        let supervisor =
            TimeoutSupervisor::new(book.clone(), stop.clone(), self.tick, timeout_secs).spawn();

        // Block until the source has finished delivering
        completion.wait().await;

        // No-op when the supervisor already stopped it
        stop.stop();
        supervisor.abort();
        match supervisor.await {
            Ok(exit) => debug!(?exit, "Supervisor finished"),
            Err(e) if e.is_cancelled() => debug!("Stream closed before supervisor fired"),
            Err(e) => error!(error = %e, "Supervisor task failed"),
        }

        let snapshot = book.snapshot();
        let outcome = ExecutionOutcome {
            fulfilled: snapshot.fulfilled,
            error: snapshot.error.map(ExecutionError::SubscriptionRuntime),
            fills: snapshot.fills,
        };

        info!(
            fulfilled = outcome.fulfilled,
            fills = outcome.fills.len(),
            filled = %outcome.filled_quantity(),
            "Execution finished"
        );

        outcome
    }
}
