//! # Tracker Actor
//!
//! Owns everything about the live delivery: the session token, the tracked order, its
//! resolved route and the flight simulator. It is the only writer of the
//! [`TrackingSnapshot`] watch channel.
//!
//! The loop multiplexes four sources:
//!
//! ```text
//!   requests ──┐
//!   events   ──┤  select!  ──▶ state ──▶ watch::Sender<TrackingSnapshot>
//!   poll tick ─┤
//!   step tick ─┘
//! ```
//!
//! Backend calls never block the loop. They run in spawned tasks that post their
//! result back as a [`TrackerEvent`], so the flight keeps moving while a request is
//! in flight. Every poll carries a sequence number and a response is only applied if
//! no later poll was applied before it.

use super::error::TrackerError;
use super::messages::{TrackerEvent, TrackerRequest, TrackingSnapshot};
use super::poller::{self, PollOutcome};
use crate::clients::{ApiError, OrderBackend, TrackerClient};
use crate::config::TrackerConfig;
use crate::framework::{actor_name, next_tick, Response};
use crate::model::{AuthToken, Order, OrderId, OrderStatus, Route};
use crate::resolver;
use crate::simulation::{FlightPhase, FlightSimulator};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// The live-tracking actor.
///
/// Create it with [`tracker_actor::new`](crate::tracker_actor::new) and spawn
/// [`run`](TrackerActor::run).
pub struct TrackerActor {
    receiver: mpsc::Receiver<TrackerRequest>,
    events: mpsc::Receiver<TrackerEvent>,
    events_tx: mpsc::Sender<TrackerEvent>,
    backend: Arc<dyn OrderBackend>,
    snapshots: watch::Sender<TrackingSnapshot>,
    poll_interval: Duration,
    token: Option<AuthToken>,
    order: Option<Order>,
    route: Option<Route>,
    simulator: FlightSimulator,
    revision: u64,
    poll_timer: Option<Interval>,
    flight_timer: Option<Interval>,
    polls_issued: u64,
    polls_applied: u64,
}

impl TrackerActor {
    /// Creates a new `TrackerActor` and its associated `TrackerClient`.
    ///
    /// Nothing is polled until a token is set through the client.
    pub fn new(config: &TrackerConfig, backend: Arc<dyn OrderBackend>) -> (Self, TrackerClient) {
        let (sender, receiver) = mpsc::channel(config.channel_capacity.max(1));
        let (events_tx, events) = mpsc::channel(config.channel_capacity.max(1));
        let (snapshots, snapshot_rx) = watch::channel(TrackingSnapshot::default());

        let actor = Self {
            receiver,
            events,
            events_tx,
            backend,
            snapshots,
            poll_interval: config.poll_interval.max(MIN_PERIOD),
            token: None,
            order: None,
            route: None,
            simulator: FlightSimulator::from_config(config),
            revision: 0,
            poll_timer: None,
            flight_timer: None,
            polls_issued: 0,
            polls_applied: 0,
        };
        (actor, TrackerClient::new(sender, snapshot_rx))
    }

    /// Runs the actor's event loop until every client is dropped.
    ///
    /// Dropping the actor drops both timers, so nothing keeps ticking after shutdown.
    pub async fn run(mut self) {
        let actor = actor_name::<Self>();
        info!(actor, "Actor started");

        loop {
            tokio::select! {
                request = self.receiver.recv() => match request {
                    Some(request) => self.handle_request(request),
                    None => break,
                },
                Some(event) = self.events.recv() => self.handle_event(event),
                _ = next_tick(&mut self.poll_timer) => {
                    if let Some(token) = self.token.clone() {
                        self.spawn_poll(token, None);
                    }
                }
                _ = next_tick(&mut self.flight_timer) => self.step_flight(),
            }
        }

        info!(actor, revision = self.revision, "Shutdown");
    }

    fn handle_request(&mut self, request: TrackerRequest) {
        match request {
            TrackerRequest::SetToken { token, respond_to } => {
                debug!(?token, "SetToken");
                self.set_token(token);
                let _ = respond_to.send(());
            }
            TrackerRequest::ClearToken { respond_to } => {
                debug!("ClearToken");
                self.clear_token();
                let _ = respond_to.send(());
            }
            TrackerRequest::PollNow { respond_to } => {
                debug!("PollNow");
                match self.token.clone() {
                    Some(token) => self.spawn_poll(token, Some(respond_to)),
                    None => {
                        let _ = respond_to.send(Err(TrackerError::NotAuthenticated));
                    }
                }
            }
            TrackerRequest::StartFlight { respond_to } => {
                debug!("StartFlight");
                let result = match self.route.filter(|_| self.order.is_some()) {
                    Some(route) => {
                        self.start_flight(route);
                        Ok(route)
                    }
                    None => {
                        warn!("Cannot start a flight without an active order");
                        Err(TrackerError::NoActiveOrder)
                    }
                };
                let _ = respond_to.send(result);
            }
            TrackerRequest::StartFlightBetween {
                origin,
                destination,
                respond_to,
            } => {
                debug!(%origin, %destination, "StartFlightBetween");
                let route = Route::new(origin, destination);
                self.start_flight(route);
                let _ = respond_to.send(route);
            }
            TrackerRequest::CancelFlight { respond_to } => {
                debug!("CancelFlight");
                let cancelled = self.simulator.cancel();
                if cancelled {
                    self.flight_timer = None;
                    info!(progress = self.simulator.progress(), "Flight cancelled");
                    self.settle_marker();
                    self.publish();
                }
                let _ = respond_to.send(cancelled);
            }
            TrackerRequest::Complete {
                order_id,
                respond_to,
            } => {
                debug!(%order_id, "Complete");
                self.begin_completion(order_id, respond_to);
            }
            TrackerRequest::Snapshot { respond_to } => {
                let _ = respond_to.send(self.snapshot());
            }
        }
    }

    fn handle_event(&mut self, event: TrackerEvent) {
        match event {
            TrackerEvent::PollCompleted {
                seq,
                result,
                respond_to,
            } => {
                let outcome = if seq <= self.polls_applied {
                    debug!(seq, applied = self.polls_applied, "Discarding stale poll");
                    PollOutcome::Stale
                } else {
                    self.apply_poll(seq, result)
                };
                if let Some(respond_to) = respond_to {
                    let _ = respond_to.send(Ok(outcome));
                }
            }
            TrackerEvent::CompletionResolved {
                order_id,
                result,
                respond_to,
            } => {
                let reply = match result {
                    Ok(()) => self.mark_delivered(&order_id),
                    Err(e) => {
                        warn!(%order_id, error = %e, "Completion failed, order unchanged");
                        Err(TrackerError::Api(e))
                    }
                };
                let _ = respond_to.send(reply);
            }
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    fn set_token(&mut self, token: AuthToken) {
        if self.token.as_ref() == Some(&token) {
            debug!("Token unchanged");
            return;
        }

        // Another account: nothing of the previous session may leak into this one.
        self.clear_tracking();
        self.polls_applied = self.polls_issued;
        self.token = Some(token);

        let mut timer = time::interval(self.poll_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.poll_timer = Some(timer);

        info!(poll_interval = ?self.poll_interval, "Polling started");
        self.publish();
    }

    fn clear_token(&mut self) {
        self.token = None;
        self.poll_timer = None;
        self.clear_tracking();
        self.polls_applied = self.polls_issued;
        info!("Polling stopped");
        self.publish();
    }

    // =========================================================================
    // Polling
    // =========================================================================

    fn spawn_poll(
        &mut self,
        token: AuthToken,
        respond_to: Option<Response<Result<PollOutcome, TrackerError>>>,
    ) {
        self.polls_issued += 1;
        let seq = self.polls_issued;
        let backend = Arc::clone(&self.backend);
        let events = self.events_tx.clone();
        debug!(seq, "Polling current order");

        tokio::spawn(async move {
            let result = backend.current_order(&token).await;
            let _ = events
                .send(TrackerEvent::PollCompleted {
                    seq,
                    result,
                    respond_to,
                })
                .await;
        });
    }

    fn apply_poll(&mut self, seq: u64, result: Result<Option<Order>, ApiError>) -> PollOutcome {
        let incoming = match result {
            Ok(incoming) => incoming,
            Err(e) => {
                warn!(seq, error = %e, "Poll failed, keeping current state");
                return PollOutcome::Failed;
            }
        };
        self.polls_applied = seq;

        let outcome = match incoming {
            None if self.order.is_none() => PollOutcome::Unchanged,
            None => {
                self.clear_tracking();
                PollOutcome::Cleared
            }
            Some(order) if !poller::needs_replacement(self.order.as_ref(), &order) => {
                PollOutcome::Unchanged
            }
            Some(order) => {
                self.replace_order(order);
                PollOutcome::Replaced
            }
        };

        self.settle_marker();
        self.publish();
        debug!(seq, ?outcome, "Poll applied");
        outcome
    }

    fn replace_order(&mut self, order: Order) {
        if poller::is_new_order(self.order.as_ref(), &order) {
            self.flight_timer = None;
            self.simulator.clear();
        } else if order.is_delivered() {
            // Delivered server-side: whatever the flight was doing is over.
            self.flight_timer = None;
            self.simulator.reset();
        }

        let route = resolver::resolve(&order);
        info!(order_id = %order.order_id, status = %order.status, %route, "Tracking order");
        self.route = Some(route);
        self.order = Some(order);
        self.revision += 1;
    }

    /// Drops the tracked order along with its flight.
    fn clear_tracking(&mut self) {
        self.flight_timer = None;
        self.simulator.clear();
        self.route = None;
        if let Some(order) = self.order.take() {
            info!(order_id = %order.order_id, "Stopped tracking order");
            self.revision += 1;
        }
    }

    /// Puts an idle marker where the order currently rests.
    fn settle_marker(&mut self) {
        if self.simulator.is_running() || self.simulator.has_arrived() {
            return;
        }
        if let (Some(order), Some(route)) = (&self.order, &self.route) {
            self.simulator
                .snap_to(poller::resting_position(order, route));
        }
    }

    // =========================================================================
    // Flight
    // =========================================================================

    fn start_flight(&mut self, route: Route) {
        let restarted = self.simulator.is_running();
        self.simulator.start(route);

        // Replacing the interval drops the previous one, so a restart never leaves
        // two timers stepping the same flight.
        let step = self.simulator.step_interval().max(MIN_PERIOD);
        self.flight_timer = Some(time::interval_at(Instant::now() + step, step));

        info!(%route, restarted, "Flight started");
        self.publish();
    }

    fn step_flight(&mut self) {
        match self.simulator.advance() {
            FlightPhase::Running => {}
            FlightPhase::Arrived => {
                self.flight_timer = None;
                info!(revision = self.revision, "Drone arrived");
            }
            FlightPhase::Idle => self.flight_timer = None,
        }
        self.publish();
    }

    // =========================================================================
    // Completion
    // =========================================================================

    fn begin_completion(
        &mut self,
        order_id: OrderId,
        respond_to: Response<Result<Order, TrackerError>>,
    ) {
        let Some(token) = self.token.clone() else {
            let _ = respond_to.send(Err(TrackerError::NotAuthenticated));
            return;
        };
        match &self.order {
            None => {
                let _ = respond_to.send(Err(TrackerError::NoActiveOrder));
                return;
            }
            Some(order) if order.order_id != order_id => {
                warn!(%order_id, active = %order.order_id, "Refusing to complete another order");
                let _ = respond_to.send(Err(TrackerError::NotActiveOrder(order_id)));
                return;
            }
            Some(_) => {}
        }

        info!(%order_id, "Completing order");
        let backend = Arc::clone(&self.backend);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.complete_order(&token, &order_id).await;
            let _ = events
                .send(TrackerEvent::CompletionResolved {
                    order_id,
                    result,
                    respond_to,
                })
                .await;
        });
    }

    /// Applies an acknowledged completion to the local state.
    fn mark_delivered(&mut self, order_id: &OrderId) -> Result<Order, TrackerError> {
        let Some(order) = self
            .order
            .as_mut()
            .filter(|order| order.order_id == *order_id)
        else {
            warn!(%order_id, "Order completed but is no longer tracked");
            return Err(TrackerError::NotActiveOrder(order_id.clone()));
        };
        order.status = OrderStatus::Delivered;
        let delivered = order.clone();

        self.flight_timer = None;
        self.simulator.reset();
        if let Some(route) = self.route {
            self.simulator.snap_to(route.destination);
        }
        // Polls sent before the acknowledgement may still report the old status.
        self.polls_applied = self.polls_issued;
        self.revision += 1;

        info!(%order_id, "Order delivered");
        self.publish();
        Ok(delivered)
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    fn snapshot(&self) -> TrackingSnapshot {
        TrackingSnapshot {
            order: self.order.clone(),
            route: self.route,
            simulation: self.simulator.state(),
            revision: self.revision,
            signed_in: self.token.is_some(),
        }
    }

    /// Pushes the current state to subscribers, unless nothing changed.
    fn publish(&self) {
        let next = self.snapshot();
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
