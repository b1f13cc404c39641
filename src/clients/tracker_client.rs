use crate::framework::ask;
use crate::model::{AuthToken, Coordinates, Order, OrderId, Route};
use crate::tracker_actor::{PollOutcome, TrackerError, TrackerRequest, TrackingSnapshot};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument};

/// Client for interacting with the Tracker actor.
///
/// Cheap to clone. Commands go through the actor's mailbox; reads can either ask the
/// actor ([`snapshot`](Self::snapshot)) or look at the last published state
/// ([`current`](Self::current), [`subscribe`](Self::subscribe)).
#[derive(Clone)]
pub struct TrackerClient {
    sender: mpsc::Sender<TrackerRequest>,
    snapshots: watch::Receiver<TrackingSnapshot>,
}

impl TrackerClient {
    pub fn new(
        sender: mpsc::Sender<TrackerRequest>,
        snapshots: watch::Receiver<TrackingSnapshot>,
    ) -> Self {
        Self { sender, snapshots }
    }

    /// Signs in: starts polling immediately, then on every poll interval.
    ///
    /// Setting a different token than the current one first clears everything tracked
    /// for the previous session.
    #[instrument(skip(self, token))]
    pub async fn set_token(&self, token: AuthToken) -> Result<(), TrackerError> {
        info!("Sending set_token to actor");
        ask(&self.sender, |respond_to| TrackerRequest::SetToken { token, respond_to }).await?;
        Ok(())
    }

    /// Signs out: stops polling, cancels any flight and forgets the order.
    #[instrument(skip(self))]
    pub async fn clear_token(&self) -> Result<(), TrackerError> {
        ask(&self.sender, |respond_to| TrackerRequest::ClearToken { respond_to }).await?;
        Ok(())
    }

    /// Polls the current order right away and reports what the poll changed.
    #[instrument(skip(self))]
    pub async fn poll_now(&self) -> Result<PollOutcome, TrackerError> {
        ask(&self.sender, |respond_to| TrackerRequest::PollNow { respond_to }).await?
    }

    /// Starts (or restarts) the flight along the tracked order's route.
    #[instrument(skip(self))]
    pub async fn start_flight(&self) -> Result<Route, TrackerError> {
        ask(&self.sender, |respond_to| TrackerRequest::StartFlight { respond_to }).await?
    }

    /// Starts (or restarts) a flight between two explicit endpoints.
    #[instrument(skip(self))]
    pub async fn start_flight_between(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Route, TrackerError> {
        let route = ask(&self.sender, |respond_to| TrackerRequest::StartFlightBetween {
            origin,
            destination,
            respond_to,
        })
        .await?;
        Ok(route)
    }

    /// Aborts the running flight. Returns `false` when nothing was flying.
    #[instrument(skip(self))]
    pub async fn cancel_flight(&self) -> Result<bool, TrackerError> {
        let cancelled =
            ask(&self.sender, |respond_to| TrackerRequest::CancelFlight { respond_to }).await?;
        Ok(cancelled)
    }

    /// Marks the tracked order as delivered.
    ///
    /// The backend is called first; the local order only changes once it has
    /// acknowledged. On failure the error is returned and nothing changes.
    #[instrument(skip(self))]
    pub async fn complete(&self, order_id: OrderId) -> Result<Order, TrackerError> {
        debug!(%order_id, "complete called");
        ask(&self.sender, |respond_to| TrackerRequest::Complete {
            order_id,
            respond_to,
        })
        .await?
    }

    /// Asks the actor for its state.
    pub async fn snapshot(&self) -> Result<TrackingSnapshot, TrackerError> {
        let snapshot =
            ask(&self.sender, |respond_to| TrackerRequest::Snapshot { respond_to }).await?;
        Ok(snapshot)
    }

    /// A receiver notified on every published change.
    pub fn subscribe(&self) -> watch::Receiver<TrackingSnapshot> {
        self.snapshots.clone()
    }

    /// The last published state, without a round-trip to the actor.
    pub fn current(&self) -> TrackingSnapshot {
        self.snapshots.borrow().clone()
    }
}
