//! Everything that talks to something else: the REST backend and the actors.
//!
//! - [`backend`] / [`http`]: the [`OrderBackend`] trait and its `reqwest` implementation.
//! - [`mock`]: an in-memory backend for tests.
//! - [`tracker_client`] / [`history_client`]: type-safe handles on the actors.

pub mod backend;
pub mod history_client;
pub mod http;
pub mod mock;
pub mod tracker_client;

pub use backend::*;
pub use history_client::*;
pub use http::HttpBackend;
pub use tracker_client::*;
