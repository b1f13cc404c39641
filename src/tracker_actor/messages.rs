//! Messages understood by the tracker actor, and the snapshot it publishes.

use super::error::TrackerError;
use super::poller::PollOutcome;
use crate::clients::ApiError;
use crate::framework::Response;
use crate::model::{AuthToken, Coordinates, Order, OrderId, Route};
use crate::simulation::SimulationState;
use serde::Serialize;

/// Requests sent by [`TrackerClient`](crate::clients::TrackerClient).
#[derive(Debug)]
pub enum TrackerRequest {
    SetToken {
        token: AuthToken,
        respond_to: Response<()>,
    },
    ClearToken {
        respond_to: Response<()>,
    },
    PollNow {
        respond_to: Response<Result<PollOutcome, TrackerError>>,
    },
    StartFlight {
        respond_to: Response<Result<Route, TrackerError>>,
    },
    StartFlightBetween {
        origin: Coordinates,
        destination: Coordinates,
        respond_to: Response<Route>,
    },
    CancelFlight {
        respond_to: Response<bool>,
    },
    Complete {
        order_id: OrderId,
        respond_to: Response<Result<Order, TrackerError>>,
    },
    Snapshot {
        respond_to: Response<TrackingSnapshot>,
    },
}

/// Results of backend calls, fed back into the actor by the tasks that made them.
#[derive(Debug)]
pub(crate) enum TrackerEvent {
    PollCompleted {
        seq: u64,
        result: Result<Option<Order>, ApiError>,
        respond_to: Option<Response<Result<PollOutcome, TrackerError>>>,
    },
    CompletionResolved {
        order_id: OrderId,
        result: Result<(), ApiError>,
        respond_to: Response<Result<Order, TrackerError>>,
    },
}

/// Everything a map screen needs to draw the delivery.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackingSnapshot {
    /// The tracked order, `None` when there is no active delivery.
    pub order: Option<Order>,
    /// Resolved flight endpoints of `order`.
    pub route: Option<Route>,
    pub simulation: SimulationState,
    /// Bumped whenever the tracked order is replaced, cleared or completed.
    pub revision: u64,
    pub signed_in: bool,
}
