//! `TripPlanner` - multi-day road trip planning
//!
//! This library provides the core functionality for planning a road trip:
//! routing through user stops, nearby recommendations, day-by-day schedules
//! and PDF/JSON exports.

pub mod api;
pub mod autocomplete;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod planner;
pub mod recommendations;
pub mod routing;
pub mod saved_places;
pub mod schedule;
pub mod services;
pub mod web;

// Re-export core types for public API
pub use autocomplete::{Autocomplete, FieldKind, InputField};
pub use config::TripPlannerConfig;
pub use error::TripPlannerError;
pub use models::{Location, LocationId, Recommendation};
pub use planner::{Itinerary, Notice, Services, StopId, TravelPlanner, TripState};
pub use routing::{RouteEstimate, RoutePreference};
pub use schedule::DaySchedule;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripPlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
