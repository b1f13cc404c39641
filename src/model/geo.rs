use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A point on the map, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Shifts the point by the given deltas (degrees).
    pub fn offset(self, dlat: f64, dlng: f64) -> Self {
        Self::new(self.lat + dlat, self.lng + dlng)
    }

    /// Linear interpolation towards `other`, independently per axis.
    ///
    /// `t = 0` is `self`, `t = 1` is (up to rounding) `other`.
    pub fn lerp(self, other: Coordinates, t: f64) -> Self {
        Self::new(
            self.lat + (other.lat - self.lat) * t,
            self.lng + (other.lng - self.lng) * t,
        )
    }
}

impl Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// The two endpoints of a delivery flight: restaurant to customer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub origin: Coordinates,
    pub destination: Coordinates,
}

impl Route {
    pub const fn new(origin: Coordinates, destination: Coordinates) -> Self {
        Self {
            origin,
            destination,
        }
    }

    /// Position after flying the fraction `progress` of the route.
    pub fn position_at(&self, progress: f64) -> Coordinates {
        self.origin.lerp(self.destination, progress)
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.origin, self.destination)
    }
}
