use crate::framework::ask;
use crate::history_actor::{HistoryRequest, HistorySnapshot};
use crate::model::{AuthToken, Order};
use crate::tracker_actor::TrackerError;
use tokio::sync::{mpsc, watch};
use tracing::instrument;

/// Client for interacting with the History actor.
#[derive(Clone)]
pub struct HistoryClient {
    sender: mpsc::Sender<HistoryRequest>,
    snapshots: watch::Receiver<HistorySnapshot>,
}

impl HistoryClient {
    pub fn new(
        sender: mpsc::Sender<HistoryRequest>,
        snapshots: watch::Receiver<HistorySnapshot>,
    ) -> Self {
        Self { sender, snapshots }
    }

    /// Signs in: fetches the history now and then on every refresh interval.
    #[instrument(skip(self, token))]
    pub async fn set_token(&self, token: AuthToken) -> Result<(), TrackerError> {
        ask(&self.sender, |respond_to| HistoryRequest::SetToken { token, respond_to }).await?;
        Ok(())
    }

    /// Signs out: stops refreshing and empties the cache.
    #[instrument(skip(self))]
    pub async fn clear_token(&self) -> Result<(), TrackerError> {
        ask(&self.sender, |respond_to| HistoryRequest::ClearToken { respond_to }).await?;
        Ok(())
    }

    /// Fetches the history now and returns what this fetch got.
    ///
    /// Safe to call while another fetch is running; the cache ends up with the
    /// newest fetch's list.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Vec<Order>, TrackerError> {
        ask(&self.sender, |respond_to| HistoryRequest::Refresh { respond_to }).await?
    }

    pub fn subscribe(&self) -> watch::Receiver<HistorySnapshot> {
        self.snapshots.clone()
    }

    pub fn current(&self) -> HistorySnapshot {
        self.snapshots.borrow().clone()
    }
}
