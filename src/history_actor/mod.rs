//! Order history cache, refreshed independently of live tracking.

pub mod actor;
pub mod messages;

pub use actor::HistoryActor;
pub use messages::{HistoryRequest, HistorySnapshot};

use crate::clients::{HistoryClient, OrderBackend};
use crate::config::TrackerConfig;
use std::sync::Arc;

/// Creates a new History actor and its client.
pub fn new(config: &TrackerConfig, backend: Arc<dyn OrderBackend>) -> (HistoryActor, HistoryClient) {
    HistoryActor::new(config, backend)
}
