//! Shared fill state for one execution
//!
//! The event callback appends fills while the timeout supervisor polls for
//! completion from another task. Both go through one mutex; a whole depth
//! event is evaluated inside a single critical section so the
//! read-remaining-then-append step cannot interleave.
//!
//! The lock is a `std::sync::Mutex` and is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};
use types::depth::DepthEvent;
use types::fill::Fill;
use types::order::LimitOrder;

use crate::matching::fill::{self, EventSummary};
use crate::source::SourceError;

struct BookState {
    order: LimitOrder,
    fills: Vec<Fill>,
    /// First runtime error reported by the source
    error: Option<SourceError>,
}

/// Point-in-time copy of the book
#[derive(Debug, Clone, PartialEq)]
pub struct BookSnapshot {
    pub fills: Vec<Fill>,
    pub fulfilled: bool,
    pub error: Option<SourceError>,
}

/// Fill state shared between the event path and the supervisor
#[derive(Clone)]
pub struct FillBook {
    inner: Arc<Mutex<BookState>>,
}

impl FillBook {
    pub fn new(order: LimitOrder) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BookState {
                order,
                fills: Vec::new(),
                error: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BookState> {
        // Critical sections hold no invariants a panic could break halfway
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Evaluate one depth event against the order
    pub fn apply(&self, event: &DepthEvent) -> EventSummary {
        let mut state = self.lock();
        let BookState { order, fills, .. } = &mut *state;

        if event.symbol != *order.symbol() {
            warn!(
                expected = %order.symbol(),
                received = %event.symbol,
                update_id = event.last_update_id,
                "Ignoring depth event for another symbol"
            );
            return EventSummary::default();
        }

        let summary = fill::apply_event(order, fills, event);

        if summary.malformed > 0 {
            debug!(
                update_id = event.last_update_id,
                malformed = summary.malformed,
                "Skipped malformed bid levels"
            );
        }
        if summary.appended > 0 {
            debug!(
                update_id = event.last_update_id,
                appended = summary.appended,
                filled = %fill::filled_quantity(fills),
                remaining = %fill::remaining_quantity(order, fills),
                "Fills appended"
            );
        }

        summary
    }

    pub fn is_fulfilled(&self) -> bool {
        let state = self.lock();
        fill::is_fulfilled(&state.order, &state.fills)
    }

    /// Record a runtime error from the source
    ///
    /// Keeps the first error; returns false if one was already recorded.
    pub fn record_error(&self, error: SourceError) -> bool {
        let mut state = self.lock();
        if state.error.is_some() {
            return false;
        }
        state.error = Some(error);
        true
    }

    pub fn fill_count(&self) -> usize {
        self.lock().fills.len()
    }

    pub fn snapshot(&self) -> BookSnapshot {
        let state = self.lock();
        BookSnapshot {
            fills: state.fills.clone(),
            fulfilled: fill::is_fulfilled(&state.order, &state.fills),
            error: state.error.clone(),
        }
    }
}
