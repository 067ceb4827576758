//! External map services consumed by the planner
//!
//! Each service sits behind an async trait so the planning logic can run
//! against the real HTTP clients or against in-memory fakes:
//! - [`Geocoder`]: forward and reverse geocoding (Nominatim)
//! - [`RoutingService`]: road routing (OSRM)
//! - [`PoiService`]: points-of-interest queries (Overpass)

pub mod http;
pub mod nominatim;
pub mod osrm;
pub mod overpass;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Result;
use crate::models::Location;

pub use nominatim::NominatimClient;
pub use osrm::OsrmClient;
pub use overpass::OverpassClient;

/// One geocoder match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    pub display_name: String,
    pub country: Option<String>,
}

impl GeocodeResult {
    /// Turn the match into a new trip location
    #[must_use]
    pub fn into_location(self) -> Location {
        Location::new(self.lat, self.lng, self.display_name)
    }
}

/// Total distance and time of a routed path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Category filter for a points-of-interest lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoiCategory {
    /// Tourist attractions, museums, galleries, zoos, theme parks,
    /// historic sites and parks
    Sightseeing,
    Restaurants,
}

impl PoiCategory {
    #[must_use]
    pub fn cache_prefix(self) -> &'static str {
        match self {
            PoiCategory::Sightseeing => "poi",
            PoiCategory::Restaurants => "restaurants",
        }
    }
}

/// A radius query around a point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_m: u32,
    pub limit: u32,
    pub category: PoiCategory,
}

/// A tagged OSM element returned by a POI lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiElement {
    pub id: u64,
    pub lat: f64,
    pub lng: f64,
    pub tags: BTreeMap<String, String>,
}

impl PoiElement {
    /// Tag value, treating empty strings as absent
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Free-text search, best match first
    async fn search(&self, query: &str) -> Result<Vec<GeocodeResult>>;

    /// Reverse lookup of a coordinate
    async fn reverse(&self, lat: f64, lng: f64) -> Result<Option<GeocodeResult>>;
}

#[async_trait]
pub trait RoutingService: Send + Sync {
    /// Road route through the waypoints in order
    async fn route(&self, waypoints: &[Location]) -> Result<RouteSummary>;
}

#[async_trait]
pub trait PoiService: Send + Sync {
    async fn nearby(&self, query: &PoiQuery) -> Result<Vec<PoiElement>>;
}
