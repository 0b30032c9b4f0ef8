//! Fill accumulation logic
//!
//! Pure decision functions: whether a bid is acceptable for an order, how
//! much of it to take, and whether the order is complete. No I/O and no
//! shared state; callers pass in a consistent view of the current fills.

use std::str::FromStr;

use types::depth::{Bid, DepthEvent, DepthLevel};
use types::fill::{total_quantity, Fill};
use types::numeric::{Price, Quantity};
use types::order::LimitOrder;

/// Parse a raw depth level into a bid
///
/// Returns `None` when either field is not a valid non-negative decimal.
/// Such levels are skipped, they never fail the event.
pub fn parse_bid(level: &DepthLevel) -> Option<Bid> {
    let price = Price::from_str(level.price()).ok()?;
    let quantity = Quantity::from_str(level.quantity()).ok()?;
    Some(Bid { price, quantity })
}

/// Check if a bid can contribute to the order
///
/// A bid is acceptable when it pays at least the limit price.
pub fn is_acceptable(order: &LimitOrder, bid: &Bid) -> bool {
    bid.price >= order.price()
}

/// Quantity already accumulated
pub fn filled_quantity(fills: &[Fill]) -> Quantity {
    total_quantity(fills)
}

/// Quantity still needed, floored at zero
pub fn remaining_quantity(order: &LimitOrder, fills: &[Fill]) -> Quantity {
    order.quantity().saturating_sub(filled_quantity(fills))
}

/// How much of a bid to take given the fills so far
///
/// Takes the whole bid or the remaining quantity, whichever is smaller.
/// Zero once nothing remains.
pub fn quantity_to_take(order: &LimitOrder, fills: &[Fill], bid_quantity: Quantity) -> Quantity {
    bid_quantity.min(remaining_quantity(order, fills))
}

/// Check if the fills add up to exactly the order quantity
pub fn is_fulfilled(order: &LimitOrder, fills: &[Fill]) -> bool {
    filled_quantity(fills) == order.quantity()
}

/// Counts from evaluating one depth event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventSummary {
    /// Fills appended
    pub appended: usize,
    /// Bids priced below the limit
    pub rejected: usize,
    /// Bids whose fields did not parse
    pub malformed: usize,
    /// Bids skipped because the order was already complete
    pub skipped: usize,
}

/// Evaluate every bid of one event, appending fills in bid order
///
/// Remaining quantity is recomputed before each bid, so the running total
/// can never exceed the order quantity. Bids seen after the order completes
/// are skipped, including later bids in the same event.
pub fn apply_event(order: &LimitOrder, fills: &mut Vec<Fill>, event: &DepthEvent) -> EventSummary {
    let mut summary = EventSummary::default();

    for level in &event.bids {
        if is_fulfilled(order, fills) {
            summary.skipped += 1;
            continue;
        }

        let Some(bid) = parse_bid(level) else {
            summary.malformed += 1;
            continue;
        };

        if !is_acceptable(order, &bid) {
            summary.rejected += 1;
            continue;
        }

        let take = quantity_to_take(order, fills, bid.quantity);
        if take.is_zero() {
            // Zero-quantity level (a removal in a diff stream)
            continue;
        }

        fills.push(Fill::new(event.last_update_id, bid.price, take));
        summary.appended += 1;
    }

    summary
}
