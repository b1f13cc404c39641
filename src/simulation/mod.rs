//! # Flight Simulation
//!
//! A fixed-duration, fixed-step linear interpolation between two endpoints.
//!
//! ```text
//!            start()              last step
//!   ┌──────┐ ───────▶ ┌─────────┐ ────────▶ ┌─────────┐
//!   │ Idle │          │ Running │           │ Arrived │
//!   └──────┘ ◀─────── └─────────┘           └─────────┘
//!       ▲      cancel()    │ start()             │
//!       │                  └──▶ (restart)        │
//!       └────────────────── reset() ─────────────┘
//! ```
//!
//! [`FlightSimulator`] is the pure state machine: it knows nothing about clocks.
//! The tracker actor owns the step timer and calls [`FlightSimulator::advance`] once
//! per tick, which keeps "one flight, one timer" a property of a single owner.

use crate::config::TrackerConfig;
use crate::model::{Coordinates, Route};
use serde::Serialize;
use std::time::Duration;

/// Phase of the simulated flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlightPhase {
    Idle,
    Running,
    Arrived,
}

/// Observable view of the simulation.
///
/// `has_arrived` holds exactly when `progress == 1.0` and the flight is not running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationState {
    /// Marker position; `None` until there is something to show.
    pub position: Option<Coordinates>,
    /// Completed fraction of the flight, in `[0, 1]`.
    pub progress: f64,
    pub is_running: bool,
    pub has_arrived: bool,
    /// Flight time left, zero unless running.
    pub remaining: Duration,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            position: None,
            progress: 0.0,
            is_running: false,
            has_arrived: false,
            remaining: Duration::ZERO,
        }
    }
}

/// Step-driven flight state machine.
#[derive(Debug, Clone)]
pub struct FlightSimulator {
    duration: Duration,
    steps: u32,
    route: Option<Route>,
    step: u32,
    phase: FlightPhase,
    position: Option<Coordinates>,
}

impl FlightSimulator {
    /// Creates an idle simulator. `steps` is clamped to at least one.
    pub fn new(duration: Duration, steps: u32) -> Self {
        Self {
            duration,
            steps: steps.max(1),
            route: None,
            step: 0,
            phase: FlightPhase::Idle,
            position: None,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.flight_duration, config.flight_steps)
    }

    /// Period of the timer that should drive [`advance`](Self::advance).
    pub fn step_interval(&self) -> Duration {
        self.duration / self.steps
    }

    /// Begins a flight along `route`, discarding any flight in progress.
    pub fn start(&mut self, route: Route) {
        self.route = Some(route);
        self.step = 0;
        self.phase = FlightPhase::Running;
        self.position = Some(route.origin);
    }

    /// Moves one step forward. Does nothing unless running.
    ///
    /// Progress is kept as a step count, so after exactly `steps` calls the flight is
    /// at `1.0` with the marker on the destination, without rounding drift.
    pub fn advance(&mut self) -> FlightPhase {
        let Some(route) = self.route.filter(|_| self.phase == FlightPhase::Running) else {
            return self.phase;
        };

        self.step += 1;
        if self.step >= self.steps {
            self.step = self.steps;
            self.phase = FlightPhase::Arrived;
            self.position = Some(route.destination);
        } else {
            self.position = Some(route.position_at(self.progress()));
        }
        self.phase
    }

    /// Aborts a running flight without completing it.
    ///
    /// Returns whether a flight was actually cancelled.
    pub fn cancel(&mut self) -> bool {
        if self.phase != FlightPhase::Running {
            return false;
        }
        self.phase = FlightPhase::Idle;
        self.step = 0;
        true
    }

    /// Back to `Idle` from any phase; the marker stays where it is.
    pub fn reset(&mut self) {
        self.phase = FlightPhase::Idle;
        self.step = 0;
    }

    /// Forgets the route and the marker entirely.
    pub fn clear(&mut self) {
        self.reset();
        self.route = None;
        self.position = None;
    }

    /// Places the marker while idle. Returns whether it moved.
    ///
    /// Ignored during a flight or after arrival, where the flight owns the marker.
    pub fn snap_to(&mut self, position: Coordinates) -> bool {
        if self.phase != FlightPhase::Idle || self.position == Some(position) {
            return false;
        }
        self.position = Some(position);
        true
    }

    pub fn progress(&self) -> f64 {
        match self.phase {
            FlightPhase::Arrived => 1.0,
            _ => f64::from(self.step) / f64::from(self.steps),
        }
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == FlightPhase::Running
    }

    pub fn has_arrived(&self) -> bool {
        self.phase == FlightPhase::Arrived
    }

    pub fn position(&self) -> Option<Coordinates> {
        self.position
    }

    pub fn route(&self) -> Option<Route> {
        self.route
    }

    pub fn state(&self) -> SimulationState {
        let remaining = if self.is_running() {
            self.duration.mul_f64(1.0 - self.progress())
        } else {
            Duration::ZERO
        };
        SimulationState {
            position: self.position,
            progress: self.progress(),
            is_running: self.is_running(),
            has_arrived: self.has_arrived(),
            remaining,
        }
    }
}
