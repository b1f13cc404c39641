//! Live tracking of the customer's active order.
//!
//! Polls the current order, resolves its route, drives the flight simulation and
//! commits completion. See [`actor`] for the event loop.

pub mod actor;
pub mod error;
pub mod messages;
pub mod poller;

pub use actor::TrackerActor;
pub use error::*;
pub use messages::{TrackerRequest, TrackingSnapshot};
pub use poller::PollOutcome;

use crate::clients::{OrderBackend, TrackerClient};
use crate::config::TrackerConfig;
use std::sync::Arc;

/// Creates a new Tracker actor and its client.
pub fn new(config: &TrackerConfig, backend: Arc<dyn OrderBackend>) -> (TrackerActor, TrackerClient) {
    TrackerActor::new(config, backend)
}
