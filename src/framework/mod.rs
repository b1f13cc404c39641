//! Shared actor plumbing.
//!
//! This module provides the building blocks the tracking actors are made of:
//!
//! - [`FrameworkError`] - Channel-level failures
//! - [`Response`] - One-shot reply channel carried by requests
//! - [`ask`] - Request/response helper used by every client
//! - [`next_tick`] - Optional timers inside `tokio::select!`

pub mod core;

// Re-export core types for convenience
pub use self::core::*;
