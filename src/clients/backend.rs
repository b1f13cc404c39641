//! # Backend Interface
//!
//! The three REST endpoints the tracker consumes, behind a trait so the actors can
//! run against [`HttpBackend`](crate::clients::HttpBackend) in production and
//! [`MockBackend`](crate::clients::mock::MockBackend) in tests.

use crate::model::{AuthToken, Order, OrderId};
use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by an [`OrderBackend`].
///
/// Messages are kept as strings so the error can be cloned into every reply and
/// compared in tests.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// The request never got a response (connection refused, reset, ...).
    #[error("HTTP transport error: {0}")]
    Http(String),

    /// The backend answered with a non-success status.
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// The body could not be decoded.
    #[error("Cannot decode response: {0}")]
    Decode(String),

    /// A call nobody prepared an answer for (test doubles only).
    #[error("Unexpected request: {0}")]
    Unexpected(String),
}

/// The order endpoints of the REST backend.
///
/// | Method | Path | Used by |
/// |---|---|---|
/// | GET | `/orders/current` | [`current_order`](OrderBackend::current_order) |
/// | PATCH | `/orders/{order_id}/complete` | [`complete_order`](OrderBackend::complete_order) |
/// | GET | `/orders/history` | [`order_history`](OrderBackend::order_history) |
#[async_trait]
pub trait OrderBackend: Send + Sync + 'static {
    /// The customer's active order, or `None` when there is nothing to track.
    async fn current_order(&self, token: &AuthToken) -> Result<Option<Order>, ApiError>;

    /// Marks `order_id` as delivered.
    async fn complete_order(&self, token: &AuthToken, order_id: &OrderId) -> Result<(), ApiError>;

    /// All past orders of the customer.
    async fn order_history(&self, token: &AuthToken) -> Result<Vec<Order>, ApiError>;
}
