//! Plain data: orders, coordinates and the session token.

pub mod geo;
pub mod order;
pub mod session;

pub use geo::*;
pub use order::*;
pub use session::*;
