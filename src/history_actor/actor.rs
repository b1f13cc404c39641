//! # History Actor
//!
//! Keeps the customer's past orders, refreshed on its own interval and independent
//! of live tracking.
//!
//! Fetches run in spawned tasks, so an automatic refresh and any number of manual
//! [`refresh`](crate::clients::HistoryClient::refresh) calls may overlap. The list
//! is always replaced whole by the newest fetch that has completed; a slower, older
//! fetch finishing afterwards is not allowed to bring back stale data.

use super::messages::{FetchCompleted, HistoryRequest, HistorySnapshot};
use crate::clients::{HistoryClient, OrderBackend};
use crate::config::TrackerConfig;
use crate::framework::{actor_name, next_tick, Response};
use crate::model::{AuthToken, Order};
use crate::tracker_actor::TrackerError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

pub struct HistoryActor {
    receiver: mpsc::Receiver<HistoryRequest>,
    events: mpsc::Receiver<FetchCompleted>,
    events_tx: mpsc::Sender<FetchCompleted>,
    backend: Arc<dyn OrderBackend>,
    snapshots: watch::Sender<HistorySnapshot>,
    refresh_interval: Duration,
    token: Option<AuthToken>,
    orders: Vec<Order>,
    timer: Option<Interval>,
    /// Bumped on every sign-in/sign-out; fetches of an older epoch are ignored.
    epoch: u64,
    fetches_issued: u64,
    newest_applied: u64,
    in_flight: usize,
}

impl HistoryActor {
    /// Creates a new `HistoryActor` and its associated `HistoryClient`.
    pub fn new(config: &TrackerConfig, backend: Arc<dyn OrderBackend>) -> (Self, HistoryClient) {
        let (sender, receiver) = mpsc::channel(config.channel_capacity.max(1));
        let (events_tx, events) = mpsc::channel(config.channel_capacity.max(1));
        let (snapshots, snapshot_rx) = watch::channel(HistorySnapshot::default());

        let actor = Self {
            receiver,
            events,
            events_tx,
            backend,
            snapshots,
            refresh_interval: config.history_interval.max(Duration::from_millis(1)),
            token: None,
            orders: Vec::new(),
            timer: None,
            epoch: 0,
            fetches_issued: 0,
            newest_applied: 0,
            in_flight: 0,
        };
        (actor, HistoryClient::new(sender, snapshot_rx))
    }

    pub async fn run(mut self) {
        let actor = actor_name::<Self>();
        info!(actor, "Actor started");

        loop {
            tokio::select! {
                request = self.receiver.recv() => match request {
                    Some(request) => self.handle_request(request),
                    None => break,
                },
                Some(done) = self.events.recv() => self.on_fetch_completed(done),
                _ = next_tick(&mut self.timer) => {
                    if let Some(token) = self.token.clone() {
                        self.spawn_fetch(token, None);
                    }
                }
            }
        }

        info!(actor, size = self.orders.len(), "Shutdown");
    }

    fn handle_request(&mut self, request: HistoryRequest) {
        match request {
            HistoryRequest::SetToken { token, respond_to } => {
                debug!(?token, "SetToken");
                if self.token.as_ref() != Some(&token) {
                    self.start_session(Some(token));
                }
                let _ = respond_to.send(());
            }
            HistoryRequest::ClearToken { respond_to } => {
                debug!("ClearToken");
                self.start_session(None);
                let _ = respond_to.send(());
            }
            HistoryRequest::Refresh { respond_to } => {
                debug!("Refresh");
                match self.token.clone() {
                    Some(token) => self.spawn_fetch(token, Some(respond_to)),
                    None => {
                        let _ = respond_to.send(Err(TrackerError::NotAuthenticated));
                    }
                }
            }
        }
    }

    /// Drops everything of the previous session and, with a token, starts refreshing.
    fn start_session(&mut self, token: Option<AuthToken>) {
        self.epoch += 1;
        self.in_flight = 0;
        self.newest_applied = self.fetches_issued;
        self.orders.clear();

        self.timer = token.as_ref().map(|_| {
            let mut timer = time::interval(self.refresh_interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            timer
        });
        match &token {
            Some(_) => info!(refresh_interval = ?self.refresh_interval, "History refresh started"),
            None => info!("History refresh stopped"),
        }
        self.token = token;
        self.publish();
    }

    fn spawn_fetch(
        &mut self,
        token: AuthToken,
        respond_to: Option<Response<Result<Vec<Order>, TrackerError>>>,
    ) {
        self.fetches_issued += 1;
        self.in_flight += 1;
        let epoch = self.epoch;
        let seq = self.fetches_issued;
        let backend = Arc::clone(&self.backend);
        let events = self.events_tx.clone();
        debug!(seq, in_flight = self.in_flight, "Fetching order history");

        tokio::spawn(async move {
            let result = backend.order_history(&token).await;
            let _ = events
                .send(FetchCompleted {
                    epoch,
                    seq,
                    result,
                    respond_to,
                })
                .await;
        });
        self.publish();
    }

    fn on_fetch_completed(&mut self, done: FetchCompleted) {
        let FetchCompleted {
            epoch,
            seq,
            result,
            respond_to,
        } = done;

        if epoch != self.epoch {
            debug!(seq, "Ignoring fetch from a previous session");
            if let Some(respond_to) = respond_to {
                let _ = respond_to.send(Err(TrackerError::SessionChanged));
            }
            return;
        }

        self.in_flight = self.in_flight.saturating_sub(1);
        let reply = match result {
            Ok(orders) if seq > self.newest_applied => {
                self.newest_applied = seq;
                self.orders = orders.clone();
                info!(seq, size = self.orders.len(), "History updated");
                Ok(orders)
            }
            Ok(orders) => {
                debug!(seq, newest = self.newest_applied, "Discarding older history fetch");
                Ok(orders)
            }
            Err(e) => {
                warn!(seq, error = %e, "History refresh failed, keeping cached list");
                Err(TrackerError::Api(e))
            }
        };

        self.publish();
        if let Some(respond_to) = respond_to {
            let _ = respond_to.send(reply);
        }
    }

    fn publish(&self) {
        let next = HistorySnapshot {
            orders: self.orders.clone(),
            is_loading: self.in_flight > 0,
        };
        self.snapshots.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
