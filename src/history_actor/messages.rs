use crate::clients::ApiError;
use crate::framework::Response;
use crate::model::{AuthToken, Order};
use crate::tracker_actor::TrackerError;
use serde::Serialize;

/// Requests sent by [`HistoryClient`](crate::clients::HistoryClient).
#[derive(Debug)]
pub enum HistoryRequest {
    SetToken {
        token: AuthToken,
        respond_to: Response<()>,
    },
    ClearToken {
        respond_to: Response<()>,
    },
    Refresh {
        respond_to: Response<Result<Vec<Order>, TrackerError>>,
    },
}

#[derive(Debug)]
pub(crate) struct FetchCompleted {
    pub epoch: u64,
    pub seq: u64,
    pub result: Result<Vec<Order>, ApiError>,
    pub respond_to: Option<Response<Result<Vec<Order>, TrackerError>>>,
}

/// The cached order history.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistorySnapshot {
    pub orders: Vec<Order>,
    /// True while at least one fetch is in flight.
    pub is_loading: bool,
}
