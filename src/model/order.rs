//! Customer orders as reported by the backend.
//!
//! Only the fields the tracker needs are modelled. Coordinates come from the wire as
//! whatever the backend stored (numbers, numeric strings, `null`, or nothing at all),
//! so they are kept raw here and validated by the [`resolver`](crate::resolver).

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{self, Display};

/// Opaque order identifier.
///
/// The backend sends it either as a JSON number or a string; both decode to the same
/// value, so `5` and `"5"` name the same order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderId(String);

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for OrderId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Unsigned(u64),
            Signed(i64),
            Float(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Unsigned(n) => Ok(Self::from(n)),
            Raw::Signed(n) => Ok(Self(n.to_string())),
            // `5.0` names order 5; a fractional id is not an id.
            Raw::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(Self(format!("{:.0}", f))),
            Raw::Float(f) => Err(de::Error::custom(format!("invalid order_id {}", f))),
            Raw::Text(s) if !s.trim().is_empty() => Ok(Self(s)),
            Raw::Text(_) => Err(de::Error::custom("empty order_id")),
        }
    }
}

/// Server-side lifecycle of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
    /// Any status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Unknown => "unknown",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an order. Display only.
///
/// Decoded as leniently as the coordinates: a malformed line must never stop the
/// order itself from being tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: u32,
    #[serde(default, alias = "unit_price", deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub status: OrderStatus,
    /// Restaurant latitude.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    /// Restaurant longitude.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub delivery_lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub delivery_lng: Option<f64>,
    #[serde(default)]
    pub drone_name: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total: Option<f64>,
    #[serde(default)]
    pub restaurant_name: Option<String>,
}

impl Order {
    /// Creates an order with no coordinates, items or drone.
    ///
    /// # Arguments
    /// * `order_id` - Identifier assigned by the backend
    /// * `status` - Current server-side status
    pub fn new(order_id: impl Into<OrderId>, status: OrderStatus) -> Self {
        Self {
            order_id: order_id.into(),
            status,
            lat: None,
            lng: None,
            delivery_lat: None,
            delivery_lng: None,
            drone_name: None,
            items: Vec::new(),
            total: None,
            restaurant_name: None,
        }
    }

    pub fn with_restaurant(mut self, lat: f64, lng: f64) -> Self {
        self.lat = Some(lat);
        self.lng = Some(lng);
        self
    }

    pub fn with_delivery(mut self, lat: f64, lng: f64) -> Self {
        self.delivery_lat = Some(lat);
        self.delivery_lng = Some(lng);
        self
    }

    pub fn with_drone(mut self, name: impl Into<String>) -> Self {
        self.drone_name = Some(name.into());
        self
    }

    /// Whether `other` describes the same thing the tracker displays.
    ///
    /// Only identity and status are compared; other field changes are not
    /// considered a new state.
    pub fn same_tracking_state(&self, other: &Order) -> bool {
        self.order_id == other.order_id && self.status == other.status
    }

    pub fn is_delivered(&self) -> bool {
        self.status == OrderStatus::Delivered
    }
}

/// Accepts a number, a numeric string, `null` or anything else (treated as missing).
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(de::IgnoredAny),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        Some(Raw::Other(_)) | None => None,
    })
}

/// Whole, non-negative quantities only; anything else reads as 0.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?
        .filter(|q| q.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(q))
        .map_or(0, |q| q as u32))
}
