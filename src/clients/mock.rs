//! # Mock Backend
//!
//! An in-memory [`OrderBackend`] with queued expectations, for testing the actors
//! without a server.
//!
//! Each endpoint has its own FIFO queue of canned replies. A call pops the next reply
//! of its endpoint; a call with nothing queued answers
//! [`ApiError::Unexpected`] and is remembered so that [`MockBackend::verify`] fails.
//!
//! # Example
//! ```ignore
//! let mock = Arc::new(MockBackend::new());
//! mock.expect_current_order().return_ok(Some(Order::new(5u64, OrderStatus::Preparing)));
//! mock.expect_complete(5u64).return_err(ApiError::Http("connection refused".into()));
//! mock.expect_history().with_delay(Duration::from_secs(2)).return_ok(vec![]);
//!
//! let (actor, client) = tracker_actor::new(TrackerConfig::default(), mock.clone());
//! // Use client in tests...
//! mock.verify(); // Ensures all expectations were met
//! ```

use crate::clients::backend::{ApiError, OrderBackend};
use crate::model::{AuthToken, Order, OrderId};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// A canned reply for one call.
struct Reply<T> {
    response: Result<T, ApiError>,
    delay: Option<Duration>,
    order_id: Option<OrderId>,
}

type Queue<T> = Mutex<VecDeque<Reply<T>>>;

/// Test double for the REST backend.
#[derive(Default)]
pub struct MockBackend {
    current: Queue<Option<Order>>,
    complete: Queue<()>,
    history: Queue<Vec<Order>>,
    unexpected: Mutex<Vec<String>>,
    current_calls: AtomicUsize,
    complete_calls: AtomicUsize,
    history_calls: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockBackend {
    /// Creates a mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `GET /orders/current`.
    pub fn expect_current_order(&self) -> ReplyBuilder<'_, Option<Order>> {
        ReplyBuilder::new(&self.current, None)
    }

    /// Expects a `PATCH /orders/{order_id}/complete`.
    pub fn expect_complete(&self, order_id: impl Into<OrderId>) -> ReplyBuilder<'_, ()> {
        ReplyBuilder::new(&self.complete, Some(order_id.into()))
    }

    /// Expects a `GET /orders/history`.
    pub fn expect_history(&self) -> ReplyBuilder<'_, Vec<Order>> {
        ReplyBuilder::new(&self.history, None)
    }

    pub fn current_order_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }

    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    /// Verifies that every expectation was consumed and no call went unanswered.
    pub fn verify(&self) {
        let unexpected = lock(&self.unexpected);
        if !unexpected.is_empty() {
            panic!("Unexpected requests: {:?}", *unexpected);
        }
        let remaining =
            lock(&self.current).len() + lock(&self.complete).len() + lock(&self.history).len();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }

    async fn answer<T>(
        &self,
        queue: &Queue<T>,
        request: String,
        order_id: Option<&OrderId>,
    ) -> Result<T, ApiError> {
        let reply = lock(queue).pop_front();
        let Some(reply) = reply else {
            lock(&self.unexpected).push(request.clone());
            return Err(ApiError::Unexpected(request));
        };

        if reply.order_id.as_ref() != order_id {
            let mismatch = format!("{} (expected order {:?})", request, reply.order_id);
            lock(&self.unexpected).push(mismatch.clone());
            return Err(ApiError::Unexpected(mismatch));
        }

        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        reply.response
    }
}

#[async_trait]
impl OrderBackend for MockBackend {
    async fn current_order(&self, _token: &AuthToken) -> Result<Option<Order>, ApiError> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(&self.current, "GET /orders/current".into(), None)
            .await
    }

    async fn complete_order(&self, _token: &AuthToken, order_id: &OrderId) -> Result<(), ApiError> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        let request = format!("PATCH /orders/{}/complete", order_id);
        self.answer(&self.complete, request, Some(order_id)).await
    }

    async fn order_history(&self, _token: &AuthToken) -> Result<Vec<Order>, ApiError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(&self.history, "GET /orders/history".into(), None)
            .await
    }
}

/// Builder for a queued reply.
pub struct ReplyBuilder<'a, T> {
    queue: &'a Queue<T>,
    order_id: Option<OrderId>,
    delay: Option<Duration>,
}

impl<'a, T> ReplyBuilder<'a, T> {
    fn new(queue: &'a Queue<T>, order_id: Option<OrderId>) -> Self {
        Self {
            queue,
            order_id,
            delay: None,
        }
    }

    /// Holds the reply back for `delay` (use with a paused clock).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: ApiError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<T, ApiError>) {
        lock(self.queue).push_back(Reply {
            response,
            delay: self.delay,
            order_id: self.order_id,
        });
    }
}
