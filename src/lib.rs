//! # Drone Tracker
//!
//! > **Live tracking of a food delivery, with a simulated drone flight.**
//!
//! This crate follows the active order of a signed-in customer: it polls the backend
//! for the current order, turns its (often messy) coordinates into a flight route,
//! animates a drone along that route and, once the customer confirms, marks the order
//! as delivered. An independent cache keeps the customer's order history fresh.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### One owner per piece of state
//!
//! The live delivery (token, order, route, flight) belongs to a single actor, the
//! [`TrackerActor`](tracker_actor::TrackerActor). The order history belongs to the
//! [`HistoryActor`](history_actor::HistoryActor). Each runs in its own Tokio task and
//! processes its messages one at a time, so there are no locks around tracking state
//! and "at most one flight timer" is simply a field that gets replaced.
//!
//! ### Network calls never block the loop
//!
//! Backend requests run in spawned tasks and report back to their actor as messages.
//! The drone keeps moving while a poll is in flight, and a slow response that arrives
//! after a newer one has been applied is discarded.
//!
//! ## 🚀 Core Concepts
//!
//! ### Debounce by identity
//! A poll only replaces the displayed order when `order_id` or `status` differ.
//! Repeating the same answer every five seconds changes nothing and publishes nothing.
//!
//! ### Two-phase completion
//! [`TrackerClient::complete`](clients::TrackerClient::complete) calls the backend first
//! and only flips the local status to `delivered` after the acknowledgement. A failed
//! call leaves everything as it was.
//!
//! ### Mocking: Testing without a server
//! [`MockBackend`](clients::mock::MockBackend) queues canned answers per endpoint, so
//! actor tests run against paused Tokio time with no HTTP at all.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Plumbing ([`framework`])
//! - **Role**: Request/reply over channels and optional timers inside `select!`.
//! - **Key items**: [`ask`](framework::ask), [`FrameworkError`](framework::FrameworkError).
//!
//! ### 2. The Data ([`model`], [`config`])
//! - **Role**: Orders as the backend sends them, coordinates and routes, timings.
//! - **Key items**: [`Order`](model::Order), [`Route`](model::Route),
//!   [`TrackerConfig`](config::TrackerConfig).
//!
//! ### 3. The Logic ([`resolver`], [`simulation`])
//! - **Role**: Pure, clock-free building blocks the tracker is made of.
//! - **Key items**: [`resolve`](resolver::resolve),
//!   [`FlightSimulator`](simulation::FlightSimulator).
//!
//! ### 4. The Actors ([`tracker_actor`], [`history_actor`])
//! - **Role**: Own the state, the timers and the snapshot channels.
//!
//! ### 5. The Interface ([`clients`])
//! - **Role**: The REST backend behind [`OrderBackend`](clients::OrderBackend), and
//!   the type-safe actor handles.
//! - **Key items**: [`TrackerClient`](clients::TrackerClient),
//!   [`HistoryClient`](clients::HistoryClient), [`HttpBackend`](clients::HttpBackend).
//!
//! ### 6. The Orchestrator ([`lifecycle`])
//! - **Role**: Spawns the actors for a session and shuts them down.
//! - **Key items**: [`TrackingSystem`](lifecycle::TrackingSystem),
//!   [`setup_tracing`](lifecycle::setup_tracing).
//!
//! ## 🚀 Quick Start
//!
//! ### Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run -- --api-url http://localhost:8080 --token $TOKEN
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod clients;
pub mod config;
pub mod framework;
pub mod history_actor;
pub mod lifecycle;
pub mod model;
pub mod resolver;
pub mod simulation;
pub mod tracker_actor;
