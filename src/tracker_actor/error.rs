//! Error types for the tracker and history actors.

use crate::clients::ApiError;
use crate::framework::FrameworkError;
use crate::model::OrderId;
use thiserror::Error;

/// Errors returned to callers of [`TrackerClient`](crate::clients::TrackerClient) and
/// [`HistoryClient`](crate::clients::HistoryClient).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrackerError {
    /// Nothing is being tracked right now.
    #[error("No active order")]
    NoActiveOrder,

    /// The order named in the request is not the one being tracked.
    #[error("Order {0} is not the active order")]
    NotActiveOrder(OrderId),

    /// The operation needs a signed-in customer.
    #[error("Not signed in")]
    NotAuthenticated,

    /// The customer signed out or switched accounts while the request was in flight.
    #[error("Session changed during the request")]
    SessionChanged,

    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The actor could not be reached.
    #[error("Actor communication error: {0}")]
    Framework(#[from] FrameworkError),
}
