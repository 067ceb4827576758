//! Location model for geographic coordinates and display names

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LOCATION_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity assigned to a location when it is created.
///
/// Recommendations carry the id of the location they were fetched near, so
/// grouping and schedule allocation never depend on display-name matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationId(pub u64);

impl LocationId {
    /// Allocate a fresh, process-unique id
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_LOCATION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loc-{}", self.0)
    }
}

/// A point picked by the user: source, destination or stop
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    pub id: LocationId,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lng: f64,
    /// Display name (usually the geocoder's full display name)
    pub name: String,
}

impl Location {
    /// Create a new location with a freshly allocated id
    #[must_use]
    pub fn new(lat: f64, lng: f64, name: impl Into<String>) -> Self {
        Self {
            id: LocationId::next(),
            lat,
            lng,
            name: name.into(),
        }
    }

    /// Create a location named after its own coordinates
    #[must_use]
    pub fn from_coordinates(lat: f64, lng: f64) -> Self {
        Self::new(lat, lng, format!("{lat:.5}, {lng:.5}"))
    }

    /// Exact coordinate equality, ignoring id and name
    #[must_use]
    pub fn same_coordinates(&self, other: &Location) -> bool {
        self.lat == other.lat && self.lng == other.lng
    }

    /// Whether both coordinates are finite numbers
    #[must_use]
    pub fn has_coordinates(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// First comma-separated component of the display name
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.name
            .split(',')
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.name)
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.5}, {:.5}", self.lat, self.lng)
    }

    /// Round coordinates for cache key generation
    #[must_use]
    pub fn rounded_coordinates(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.lat * multiplier).round() / multiplier;
        let lng = (self.lng * multiplier).round() / multiplier;
        (lat, lng)
    }

    /// Cache key for lookups of the given kind around this location
    #[must_use]
    pub fn cache_key(&self, kind: &str) -> String {
        let (lat, lng) = self.rounded_coordinates(3);
        format!("{kind}:{lat:.3}:{lng:.3}")
    }
}
