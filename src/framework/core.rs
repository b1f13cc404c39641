//! # Core Actor Plumbing
//!
//! The tracker and the history cache are both actors: a Tokio task that owns its
//! state and a cloneable client that talks to it over a channel. This module holds
//! the pieces they share.
//!
//! ## Key Types
//!
//! - [`FrameworkError`]: The channel-level failures (actor gone, reply dropped).
//! - [`Response`]: The one-shot reply channel carried by every request.
//! - [`ask`]: Send a request and await its reply.
//! - [`next_tick`]: Await an optional timer inside `tokio::select!`.

use std::fmt::Debug;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval};

/// Errors that can occur within the actor plumbing itself.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Actor task failed: {0}")]
    TaskFailed(String),
}

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<T>;

/// Sends a request built around a fresh reply channel and waits for the answer.
///
/// # Architecture Note
/// Every client method follows the same two steps: push the message, then await the
/// one-shot reply. A closed mailbox means the actor has shut down; a dropped reply
/// means it went away while handling the request.
pub async fn ask<M, T>(
    sender: &mpsc::Sender<M>,
    build: impl FnOnce(Response<T>) -> M,
) -> Result<T, FrameworkError> {
    let (respond_to, response) = oneshot::channel();
    sender
        .send(build(respond_to))
        .await
        .map_err(|_| FrameworkError::ActorClosed)?;
    response.await.map_err(|_| FrameworkError::ActorDropped)
}

/// Waits for the next tick of `timer`, or forever when there is no timer.
///
/// Lets an actor keep an `Option<Interval>` and still use it as a `select!` branch:
/// dropping the interval (setting it to `None`) cancels the timer.
pub async fn next_tick(timer: &mut Option<Interval>) -> Instant {
    match timer {
        Some(interval) => interval.tick().await,
        None => std::future::pending().await,
    }
}

/// Short type name used as the `actor` field in logs.
///
/// Extracts just the type name (e.g. "TrackerActor" instead of
/// "drone_tracker::tracker_actor::actor::TrackerActor").
pub fn actor_name<T>() -> &'static str {
    std::any::type_name::<T>()
        .split("::")
        .last()
        .unwrap_or("Unknown")
}
