//! Itinerary exports: a paginated PDF document and a JSON snapshot

pub mod json;
pub mod layout;
pub mod pdf;

use crate::models::Recommendation;
use crate::planner::Itinerary;
use crate::routing::{RouteEstimate, RoutePreference};
use crate::schedule::DaySchedule;

pub use json::TripExport;
pub use layout::DocumentLayout;

pub const PDF_FILE_NAME: &str = "travel-itinerary.pdf";
pub const JSON_FILE_NAME: &str = "travel-itinerary.json";

/// Everything an export needs, borrowed from the planning session
#[derive(Debug, Clone, Copy)]
pub struct ExportContext<'a> {
    pub itinerary: &'a Itinerary,
    pub route: Option<&'a RouteEstimate>,
    pub preference: RoutePreference,
    pub schedule: &'a [DaySchedule],
    pub recommendations: &'a [Recommendation],
}

impl ExportContext<'_> {
    /// Distance text, or a placeholder while no route is known
    #[must_use]
    pub fn distance_text(&self) -> String {
        self.route
            .map_or_else(|| "-".to_string(), RouteEstimate::distance_text)
    }

    #[must_use]
    pub fn duration_text(&self) -> String {
        self.route
            .map_or_else(|| "-".to_string(), |r| r.duration_text.clone())
    }
}
