//! Decisions taken on every poll of the current order.
//!
//! Kept free of channels and timers so they can be tested on plain values.

use crate::model::{Coordinates, Order, Route};
use serde::Serialize;

/// What a poll did to the tracked state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PollOutcome {
    /// A different order, or the same order in a new status, is now tracked.
    Replaced,
    /// The backend reported what is already shown.
    Unchanged,
    /// The backend reported no active order and the tracked one was dropped.
    Cleared,
    /// The request failed; the previous state is kept.
    Failed,
    /// A newer poll was applied first, so this response was discarded.
    Stale,
}

/// Whether `incoming` should replace the displayed order.
///
/// Only `order_id` and `status` count. Repeating the same pair is a no-op.
pub fn needs_replacement(current: Option<&Order>, incoming: &Order) -> bool {
    current.map_or(true, |order| !order.same_tracking_state(incoming))
}

/// Whether `incoming` is another order than the displayed one.
pub fn is_new_order(current: Option<&Order>, incoming: &Order) -> bool {
    current.map_or(true, |order| order.order_id != incoming.order_id)
}

/// Where the marker rests while no flight is running.
pub fn resting_position(order: &Order, route: &Route) -> Coordinates {
    if order.is_delivered() {
        route.destination
    } else {
        route.origin
    }
}
