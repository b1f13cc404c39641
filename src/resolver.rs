//! # Coordinate Resolver
//!
//! Turns the raw coordinates of an [`Order`] into a [`Route`] the map can always draw.
//!
//! The backend may send nothing, `null`, `0`, a string, or a value outside the globe.
//! None of that is an error here: bad components fall back to [`DEFAULT_ORIGIN`], and a
//! missing destination is placed [`DESTINATION_OFFSET`] degrees north-east of the
//! origin (about 1 km), so the flight path never collapses to a point.

use crate::model::{Coordinates, Order, Route};
use tracing::debug;

/// Fallback restaurant position (District 1, Ho Chi Minh City).
pub const DEFAULT_ORIGIN: Coordinates = Coordinates::new(10.7769, 106.7009);

/// Offset applied to both axes when the destination has to be synthesized.
pub const DESTINATION_OFFSET: f64 = 0.01;

const MAX_LAT: f64 = 90.0;
const MAX_LNG: f64 = 180.0;

/// Resolves the flight endpoints of `order`.
///
/// Always returns two finite, distinct points.
pub fn resolve(order: &Order) -> Route {
    let origin = Coordinates::new(
        usable(order.lat, MAX_LAT).unwrap_or(DEFAULT_ORIGIN.lat),
        usable(order.lng, MAX_LNG).unwrap_or(DEFAULT_ORIGIN.lng),
    );

    let delivered_to = match (
        usable(order.delivery_lat, MAX_LAT),
        usable(order.delivery_lng, MAX_LNG),
    ) {
        (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
        _ => None,
    };

    let destination = match delivered_to {
        Some(point) if point != origin => point,
        _ => {
            debug!(order_id = %order.order_id, %origin, "Synthesizing destination");
            origin.offset(DESTINATION_OFFSET, DESTINATION_OFFSET)
        }
    };

    Route::new(origin, destination)
}

/// A component is usable when present, finite, non-zero and on the globe.
fn usable(value: Option<f64>, limit: f64) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0 && v.abs() <= limit)
}
