//! Location Resolution Module
//!
//! Turns free-text searches and map clicks into trip [`Location`]s via the
//! configured geocoder.

use tracing::{debug, warn};

use crate::models::Location;
use crate::services::{GeocodeResult, Geocoder};
use crate::{Result, TripPlannerError};

/// Minimum query length before suggestions are requested
pub const MIN_SUGGEST_CHARS: usize = 2;

/// Stateless wrapper around a geocoder
pub struct LocationResolver<'a> {
    geocoder: &'a dyn Geocoder,
}

impl<'a> LocationResolver<'a> {
    #[must_use]
    pub fn new(geocoder: &'a dyn Geocoder) -> Self {
        Self { geocoder }
    }

    /// Resolve a search box query to its best match.
    ///
    /// An empty query is a no-op and never reaches the geocoder.
    pub async fn resolve_query(&self, query: &str) -> Result<Option<Location>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }
        debug!("Geocoding location name: {}", query);

        let best = self
            .geocoder
            .search(query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TripPlannerError::not_found("Location not found"))?;

        debug!(
            "Found location: {} ({:.4}, {:.4})",
            best.display_name, best.lat, best.lng
        );
        Ok(Some(best.into_location()))
    }

    /// Resolve a picked map coordinate to a named location.
    ///
    /// Never fails: when reverse geocoding errors or finds nothing the
    /// location is named after its coordinates.
    pub async fn resolve_coordinates(&self, lat: f64, lng: f64) -> Location {
        debug!("Resolving coordinates: ({}, {})", lat, lng);

        match self.geocoder.reverse(lat, lng).await {
            Ok(Some(result)) => Location::new(lat, lng, result.display_name),
            Ok(None) => {
                debug!("No reverse geocoding results found, using coordinates as name");
                Location::from_coordinates(lat, lng)
            }
            Err(e) => {
                warn!("Reverse geocoding failed: {}, using coordinates as name", e);
                Location::from_coordinates(lat, lng)
            }
        }
    }

    /// Suggestion list for a partially typed query
    pub async fn suggest(&self, query: &str) -> Result<Vec<GeocodeResult>> {
        let query = query.trim();
        if query.chars().count() < MIN_SUGGEST_CHARS {
            return Ok(Vec::new());
        }
        self.geocoder.search(query).await
    }
}
