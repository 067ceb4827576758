//! OSRM road-routing client

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::http::check_status;
use super::{RouteSummary, RoutingService};
use crate::config::ServicesConfig;
use crate::models::Location;
use crate::{Result, TripPlannerError};

const PROFILE: &str = "driving";

pub struct OsrmClient {
    client: ClientWithMiddleware,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Meters
    distance: f64,
    /// Seconds
    duration: f64,
}

impl OsrmClient {
    #[must_use]
    pub fn new(client: ClientWithMiddleware, config: &ServicesConfig) -> Self {
        Self {
            client,
            base_url: config.osrm_url.trim_end_matches('/').to_string(),
        }
    }

    /// OSRM takes `lng,lat` pairs separated by semicolons
    fn route_url(&self, waypoints: &[Location]) -> String {
        let coordinates = waypoints
            .iter()
            .map(|p| format!("{},{}", p.lng, p.lat))
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/route/v1/{PROFILE}/{coordinates}?overview=false",
            self.base_url
        )
    }
}

fn summary_from(response: OsrmResponse) -> Result<RouteSummary> {
    if response.code != "Ok" {
        return Err(TripPlannerError::api(format!(
            "Routing failed ({}): {}",
            response.code,
            response.message.unwrap_or_default()
        )));
    }

    response
        .routes
        .first()
        .map(|route| RouteSummary {
            distance_m: route.distance,
            duration_s: route.duration,
        })
        .ok_or_else(|| TripPlannerError::api("No routes in response"))
}

#[async_trait]
impl RoutingService for OsrmClient {
    #[instrument(skip(self, waypoints), fields(points = waypoints.len()))]
    async fn route(&self, waypoints: &[Location]) -> Result<RouteSummary> {
        let url = self.route_url(waypoints);
        debug!("Calling OSRM: {}", url);

        let response = self.client.get(url).send().await?;
        // OSRM reports "NoRoute" with a 400 status and a JSON body.
        let parsed: OsrmResponse = if response.status().as_u16() == 400 {
            response.json().await?
        } else {
            check_status("OSRM", response).await?.json().await?
        };
        summary_from(parsed)
    }
}
