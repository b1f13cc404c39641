//! # Observability & Tracing
//!
//! The [`setup_tracing`] function installs the `tracing` subscriber used by the demo
//! binary. Library code only emits events; it never installs a subscriber itself.
//!
//! ## Configuration
//!
//! Log lines use the compact format without the module prefix (`with_target(false)`);
//! the `actor` field says which actor is talking. Levels come from `RUST_LOG`:
//!
//! ```bash
//! # Lifecycle, order changes, arrivals and failures
//! RUST_LOG=info cargo run -- --token $TOKEN
//!
//! # Every message, poll sequence numbers and discarded responses
//! RUST_LOG=debug cargo run -- --token $TOKEN
//!
//! # Raw response bodies of the HTTP backend
//! RUST_LOG=drone_tracker::clients::http=trace cargo run -- --token $TOKEN
//! ```
//!
//! ## What Gets Traced
//!
//! - **Actor Lifecycle**: `Actor started` / `Shutdown` with the actor name
//! - **Order Changes**: `Tracking order order_id=5 status=preparing route=...`
//! - **Flight**: `Flight started`, `Flight cancelled`, `Drone arrived`
//! - **Failures**: poll and history failures at `warn`, with the error and the kept state
//!
//! ## Example
//!
//! ```text
//! INFO Actor started actor="TrackerActor"
//! INFO set_token: Sending set_token to actor
//! INFO Polling started poll_interval=5s
//! INFO Tracking order order_id=5 status=out_for_delivery route=(10.000000, 106.000000) -> (10.100000, 106.100000)
//! INFO Flight started route=(10.000000, 106.000000) -> (10.100000, 106.100000) restarted=false
//! WARN Poll failed, keeping current state seq=3 error=HTTP transport error: connection refused
//! INFO Drone arrived revision=1
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
