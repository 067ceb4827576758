//! JSON snapshot of a planned trip

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::ExportContext;
use crate::Result;
use crate::models::{Location, Recommendation};
use crate::routing::RoutePreference;
use crate::schedule::DaySchedule;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDetails {
    pub source: Location,
    pub destination: Location,
    /// e.g. "149 km", "-" when no route is known
    pub distance: String,
    pub duration: String,
    pub estimated_cost: Option<u64>,
    pub route_preference: RoutePreference,
    pub trip_duration: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripExport {
    pub trip_details: TripDetails,
    pub days: Vec<DaySchedule>,
    pub recommendations: Vec<Recommendation>,
    /// RFC 3339, UTC
    pub export_date: String,
}

impl TripExport {
    #[must_use]
    pub fn new(ctx: &ExportContext<'_>, exported_at: DateTime<Utc>) -> Self {
        Self {
            trip_details: TripDetails {
                source: ctx.itinerary.source.clone(),
                destination: ctx.itinerary.destination.clone(),
                distance: ctx.distance_text(),
                duration: ctx.duration_text(),
                estimated_cost: ctx.route.map(|r| r.cost),
                route_preference: ctx.preference,
                trip_duration: ctx.itinerary.trip_duration,
            },
            days: ctx.schedule.to_vec(),
            recommendations: ctx.recommendations.to_vec(),
            export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Pretty-printed document
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
