//! Depth event source abstraction
//!
//! The engine only needs three things from a market data feed: a way to
//! subscribe to one symbol with event and error callbacks, a termination
//! control, and a signal that delivery has finished. Transport details stay
//! behind [`DepthSource`].
//!
//! ```text
//!   engine                         source task
//!   ──────                         ───────────
//!   Subscription.stop  ──watch──▶  Delivery.stopped()
//!   Subscription.completion ◀─oneshot── Delivery (dropped on exit)
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{oneshot, watch};
use types::depth::DepthEvent;
use types::ids::Symbol;

/// Callback invoked once per delivered depth event
pub type DepthCallback = Arc<dyn Fn(DepthEvent) + Send + Sync>;

/// Callback invoked when the feed hits a runtime error
pub type ErrorCallback = Arc<dyn Fn(SourceError) + Send + Sync>;

/// Errors raised by a depth source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("replay error: {0}")]
    Replay(String),
}

/// A market depth feed
#[async_trait]
pub trait DepthSource: Send + Sync {
    /// Open a subscription for `symbol`
    ///
    /// An `Err` means nothing was started. On success the source delivers
    /// events through `on_event` until stopped or until the feed ends, then
    /// resolves the subscription's completion.
    async fn subscribe(
        &self,
        symbol: &Symbol,
        on_event: DepthCallback,
        on_error: ErrorCallback,
    ) -> Result<Subscription, SourceError>;
}

/// Termination control for a subscription
///
/// Stopping is idempotent. Any number of clones may call [`StopHandle::stop`];
/// only the first call has an effect.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    /// Request termination. Returns true only for the call that flipped it.
    pub fn stop(&self) -> bool {
        self.tx.send_if_modified(|stopped| {
            if *stopped {
                false
            } else {
                *stopped = true;
                true
            }
        })
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Resolves once the source has finished delivering events
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<()>,
}

impl Completion {
    /// Wait for delivery to end
    ///
    /// Also resolves if the source task went away without signalling.
    pub async fn wait(self) {
        let _ = self.rx.await;
    }
}

/// Engine side of an open subscription
#[derive(Debug)]
pub struct Subscription {
    pub stop: StopHandle,
    pub completion: Completion,
}

impl Subscription {
    /// Create a linked subscription and delivery pair
    ///
    /// Sources return the `Subscription` to the engine and move the
    /// `Delivery` into their delivery task.
    pub fn channel() -> (Subscription, Delivery) {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (done_tx, done_rx) = oneshot::channel();

        let subscription = Subscription {
            stop: StopHandle {
                tx: Arc::new(stop_tx),
            },
            completion: Completion { rx: done_rx },
        };
        let delivery = Delivery {
            stop: stop_rx,
            _done: done_tx,
        };

        (subscription, delivery)
    }
}

/// Source side of an open subscription
///
/// Dropping it resolves the engine's [`Completion`], so completion fires
/// exactly once on every exit path of the delivery task.
#[derive(Debug)]
pub struct Delivery {
    stop: watch::Receiver<bool>,
    _done: oneshot::Sender<()>,
}

impl Delivery {
    /// Wait until termination is requested
    ///
    /// Returns immediately if it already was, or if every stop handle has
    /// been dropped.
    pub async fn stopped(&mut self) {
        let _ = self.stop.wait_for(|stopped| *stopped).await;
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop.borrow()
    }
}
