//! Route estimates: distance, duration text and the linear cost model.
//!
//! The route geometry always comes from the routing service with the same
//! driving profile; the preference only selects the cost per kilometer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, instrument};

use crate::config::CostsConfig;
use crate::models::Location;
use crate::services::{RouteSummary, RoutingService};
use crate::{Result, TripPlannerError};

/// User-selected route preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutePreference {
    #[default]
    Default,
    Cheapest,
    Scenic,
}

impl RoutePreference {
    /// Display label, e.g. "Cheapest Route"
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RoutePreference::Default => "Default Route",
            RoutePreference::Cheapest => "Cheapest Route",
            RoutePreference::Scenic => "Scenic Route",
        }
    }
}

impl fmt::Display for RoutePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoutePreference::Default => "default",
            RoutePreference::Cheapest => "cheapest",
            RoutePreference::Scenic => "scenic",
        };
        f.write_str(name)
    }
}

impl FromStr for RoutePreference {
    type Err = TripPlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "default" => Ok(RoutePreference::Default),
            "cheapest" => Ok(RoutePreference::Cheapest),
            "scenic" => Ok(RoutePreference::Scenic),
            other => Err(TripPlannerError::validation(format!(
                "Unknown route preference '{other}'"
            ))),
        }
    }
}

/// What the user sees about a computed route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEstimate {
    /// Whole kilometers
    pub distance_km: u64,
    pub duration_seconds: f64,
    pub duration_text: String,
    pub cost: u64,
    pub preference: RoutePreference,
}

impl RouteEstimate {
    /// Derive the display estimate from a raw routing summary
    #[must_use]
    pub fn from_summary(
        summary: &RouteSummary,
        preference: RoutePreference,
        costs: &CostsConfig,
    ) -> Self {
        let distance_km = (summary.distance_m / 1000.0).round().max(0.0) as u64;
        Self {
            distance_km,
            duration_seconds: summary.duration_s,
            duration_text: format_duration(summary.duration_s),
            cost: estimate_cost(distance_km, costs.per_km(preference)),
            preference,
        }
    }

    #[must_use]
    pub fn distance_text(&self) -> String {
        format!("{} km", self.distance_km)
    }
}

/// `round(distance_km × cost_per_km)`
#[must_use]
pub fn estimate_cost(distance_km: u64, cost_per_km: u32) -> u64 {
    distance_km * u64::from(cost_per_km)
}

/// Human duration text.
///
/// `< 60` minutes → `"45 min"`; `< 24` hours → `"3 h"` or `"3h 20m"`;
/// otherwise `"2 days 5h"`.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    let minutes = (seconds / 60.0).round().max(0.0) as u64;
    if minutes < 60 {
        return format!("{minutes} min");
    }

    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours < 24 {
        return if mins == 0 {
            format!("{hours} h")
        } else {
            format!("{hours}h {mins}m")
        };
    }

    let days = hours / 24;
    let rem_hours = hours % 24;
    let day_word = if days == 1 { "day" } else { "days" };
    if rem_hours == 0 {
        format!("{days} {day_word}")
    } else {
        format!("{days} {day_word} {rem_hours}h")
    }
}

/// Request a route for the waypoints and turn it into an estimate
#[instrument(skip(router, waypoints, costs), fields(points = waypoints.len()))]
pub async fn plan_route(
    router: &dyn RoutingService,
    waypoints: &[Location],
    preference: RoutePreference,
    costs: &CostsConfig,
) -> Result<RouteEstimate> {
    if waypoints.len() < 2 {
        return Err(TripPlannerError::validation(
            "At least two points are needed for a route",
        ));
    }

    let summary = router.route(waypoints).await?;
    let estimate = RouteEstimate::from_summary(&summary, preference, costs);
    info!(
        "Route found: {} km, {} ({} at {})",
        estimate.distance_km, estimate.duration_text, estimate.cost, preference
    );
    Ok(estimate)
}
