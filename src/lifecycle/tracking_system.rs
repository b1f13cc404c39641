use crate::clients::{HistoryClient, OrderBackend, TrackerClient};
use crate::config::TrackerConfig;
use crate::framework::FrameworkError;
use crate::model::AuthToken;
use crate::tracker_actor::TrackerError;
use std::sync::Arc;
use tracing::{error, info};

/// Owns the actors of one tracking session.
///
/// `TrackingSystem` is responsible for:
/// - **Lifecycle Management**: Spawning the tracker and history actors and stopping them
/// - **Session Fan-out**: Handing the same token to both actors on sign-in/sign-out
///
/// Several systems can run side by side (tests do), each with its own backend.
///
/// # Example
///
/// ```ignore
/// let backend = Arc::new(HttpBackend::new(&BackendConfig::new("http://localhost:8080"))?);
/// let system = TrackingSystem::new(&TrackerConfig::default(), backend);
///
/// system.sign_in(AuthToken::new(token)).await?;
/// let mut snapshots = system.tracker.subscribe();
/// snapshots.changed().await?;
///
/// system.shutdown().await?;
/// ```
pub struct TrackingSystem {
    /// Client for the live-tracking actor
    pub tracker: TrackerClient,

    /// Client for the order-history actor
    pub history: HistoryClient,

    /// Task handles of the actors (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl TrackingSystem {
    /// Spawns both actors. Nothing is fetched until [`sign_in`](Self::sign_in).
    pub fn new(config: &TrackerConfig, backend: Arc<dyn OrderBackend>) -> Self {
        let (tracker_actor, tracker) = crate::tracker_actor::new(config, Arc::clone(&backend));
        let (history_actor, history) = crate::history_actor::new(config, backend);

        let tracker_handle = tokio::spawn(tracker_actor.run());
        let history_handle = tokio::spawn(history_actor.run());

        Self {
            tracker,
            history,
            handles: vec![tracker_handle, history_handle],
        }
    }

    /// Starts polling the current order and refreshing the history for `token`.
    pub async fn sign_in(&self, token: AuthToken) -> Result<(), TrackerError> {
        info!("Signing in");
        self.tracker.set_token(token.clone()).await?;
        self.history.set_token(token).await
    }

    /// Stops all polling and forgets everything fetched for the session.
    pub async fn sign_out(&self) -> Result<(), TrackerError> {
        info!("Signing out");
        self.tracker.clear_token().await?;
        self.history.clear_token().await
    }

    /// Gracefully shuts down both actors.
    ///
    /// Dropping the clients closes the mailboxes; each actor then leaves its loop and
    /// drops its timers. Clones of the clients held elsewhere keep their actor alive,
    /// so drop those first.
    pub async fn shutdown(self) -> Result<(), FrameworkError> {
        info!("Shutting down tracking system...");
        drop(self.tracker);
        drop(self.history);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Actor task failed");
                return Err(FrameworkError::TaskFailed(e.to_string()));
            }
        }

        info!("Tracking system shutdown complete.");
        Ok(())
    }
}
