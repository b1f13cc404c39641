//! # Drone Tracker demo
//!
//! Signs in against a running backend and follows the customer's active order:
//!
//! 1.  Logs every order change reported by the poller.
//! 2.  Launches the drone when the order goes out for delivery.
//! 3.  With `--auto-complete`, confirms the delivery once the drone has arrived.
//!
//! Stop with Ctrl-C.

use clap::Parser;
use drone_tracker::clients::HttpBackend;
use drone_tracker::config::{BackendConfig, TrackerConfig};
use drone_tracker::lifecycle::{setup_tracing, TrackingSystem};
use drone_tracker::model::{AuthToken, OrderId, OrderStatus};
use drone_tracker::tracker_actor::TrackingSnapshot;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn, Instrument};

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), version, about = "Follow a drone delivery")]
struct Opts {
    /// Base URL of the REST backend
    #[arg(long, env = "TRACKER_API_URL", default_value = "http://localhost:8080")]
    api_url: String,
    /// Bearer token of the customer
    #[arg(long, env = "TRACKER_TOKEN")]
    token: String,
    /// JSON file with tracker timings (milliseconds)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
    /// Confirm the delivery as soon as the drone arrives
    #[arg(long)]
    auto_complete: bool,
}

/// What the demo has already done for the tracked order.
#[derive(Default)]
struct Progress {
    revision: u64,
    launched: Option<OrderId>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let opts = Opts::parse();
    setup_tracing();

    let config = match &opts.config {
        Some(path) => TrackerConfig::load(path).map_err(|e| e.to_string())?,
        None => TrackerConfig::default(),
    };
    let backend = HttpBackend::new(&BackendConfig::new(opts.api_url.clone()))
        .map_err(|e| e.to_string())?;

    info!(api_url = %opts.api_url, "Starting drone tracker");
    let system = TrackingSystem::new(&config, Arc::new(backend));

    system
        .sign_in(AuthToken::new(opts.token.clone()))
        .instrument(tracing::info_span!("sign_in"))
        .await
        .map_err(|e| e.to_string())?;

    let mut tracking = system.tracker.subscribe();
    let mut history = system.history.subscribe();
    let mut progress = Progress::default();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            changed = tracking.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = tracking.borrow_and_update().clone();
                follow(&system, &opts, &snapshot, &mut progress).await;
            }
            changed = history.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = history.borrow_and_update().clone();
                if !snapshot.is_loading {
                    info!(orders = snapshot.orders.len(), "Order history refreshed");
                }
            }
        }
    }

    if let Err(e) = system.sign_out().await {
        error!(error = %e, "Sign-out failed");
    }
    drop(tracking);
    drop(history);
    system.shutdown().await.map_err(|e| e.to_string())?;

    info!("Drone tracker stopped");
    Ok(())
}

/// Reacts to one tracking snapshot.
async fn follow(
    system: &TrackingSystem,
    opts: &Opts,
    snapshot: &TrackingSnapshot,
    progress: &mut Progress,
) {
    if snapshot.revision != progress.revision {
        progress.revision = snapshot.revision;
        match &snapshot.order {
            Some(order) => info!(order_id = %order.order_id, status = %order.status, "Order update"),
            None => info!("No active order"),
        }
    }

    let Some(order) = &snapshot.order else {
        progress.launched = None;
        return;
    };
    let sim = &snapshot.simulation;

    if sim.is_running {
        if let Some(position) = sim.position {
            debug!(%position, progress = sim.progress, remaining = ?sim.remaining, "In flight");
        }
        return;
    }

    if order.status == OrderStatus::OutForDelivery
        && progress.launched.as_ref() != Some(&order.order_id)
    {
        match system.tracker.start_flight().await {
            Ok(route) => {
                info!(order_id = %order.order_id, %route, "Drone launched");
                progress.launched = Some(order.order_id.clone());
            }
            Err(e) => warn!(error = %e, "Cannot launch drone"),
        }
    } else if sim.has_arrived {
        if !opts.auto_complete {
            info!(order_id = %order.order_id, "Drone arrived, waiting for confirmation");
            return;
        }
        match system.tracker.complete(order.order_id.clone()).await {
            Ok(order) => info!(order_id = %order.order_id, "Delivery confirmed"),
            Err(e) => warn!(error = %e, "Delivery confirmation failed"),
        }
    }
}
