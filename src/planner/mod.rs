//! Planning session
//!
//! [`TravelPlanner`] owns the trip state of one session, applies user
//! actions to it and re-plans after every change: route estimate,
//! recommendations along the way and restaurants at the destination.
//! Problems the user should see are queued as [`Notice`]s instead of
//! aborting the session.

pub mod itinerary;
pub mod state;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::autocomplete::InputField;
use crate::config::TripPlannerConfig;
use crate::export::{self, DocumentLayout, ExportContext, TripExport};
use crate::location_resolver::LocationResolver;
use crate::models::{Location, Recommendation, Restaurant};
use crate::recommendations::RecommendationAggregator;
use crate::routing::{self, RouteEstimate, RoutePreference};
use crate::saved_places::SavedPlaces;
use crate::schedule::{self, DaySchedule};
use crate::services::{GeocodeResult, Geocoder, PoiService, RoutingService};
use crate::{Result, TripPlannerError};

pub use itinerary::Itinerary;
pub use state::{DayStops, MAX_TRIP_DAYS, Stop, StopId, StopOrigin, TripState};

const ROUTE_FAILED: &str =
    "Could not find a route between the selected points. Please try different locations.";
const GEOCODER_UNREACHABLE: &str =
    "Could not reach the geocoding service. Check your connection and try again.";
const INVALID_DURATION: &str = "Please enter a number of days between 1 and 7.";

/// Parse a trip duration typed by the user: a whole number of days, 1 to 7
pub fn parse_trip_duration(input: &str) -> Result<u8> {
    let input = input.trim();
    match input.parse::<u8>() {
        Ok(days) if (1..=MAX_TRIP_DAYS).contains(&days) => Ok(days),
        _ => Err(TripPlannerError::validation(format!(
            "Trip duration must be between 1 and {MAX_TRIP_DAYS} days, got '{input}'"
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Dismissible message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// External collaborators of a planning session
#[derive(Clone)]
pub struct Services {
    pub geocoder: Arc<dyn Geocoder>,
    pub router: Arc<dyn RoutingService>,
    pub poi: Arc<dyn PoiService>,
}

pub struct TravelPlanner {
    state: TripState,
    services: Services,
    config: Arc<TripPlannerConfig>,
    saved: Option<SavedPlaces>,
    route: Option<RouteEstimate>,
    recommendations: Vec<Recommendation>,
    restaurants: Vec<Restaurant>,
    notices: Vec<Notice>,
}

impl TravelPlanner {
    #[must_use]
    pub fn new(services: Services, config: Arc<TripPlannerConfig>) -> Self {
        Self::with_state(TripState::new(), services, config)
    }

    /// Session over an already assembled trip state
    #[must_use]
    pub fn with_state(state: TripState, services: Services, config: Arc<TripPlannerConfig>) -> Self {
        Self {
            state,
            services,
            config,
            saved: None,
            route: None,
            recommendations: Vec::new(),
            restaurants: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Record searched and selected places in the recent list
    #[must_use]
    pub fn with_saved_places(mut self, saved: SavedPlaces) -> Self {
        self.saved = Some(saved);
        self
    }

    #[must_use]
    pub fn state(&self) -> &TripState {
        &self.state
    }

    #[must_use]
    pub fn route(&self) -> Option<&RouteEstimate> {
        self.route.as_ref()
    }

    #[must_use]
    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    #[must_use]
    pub fn restaurants(&self) -> &[Restaurant] {
        &self.restaurants
    }

    #[must_use]
    pub fn itinerary(&self) -> Option<Itinerary> {
        self.state.itinerary()
    }

    /// Drain the pending notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, notice: Notice) {
        debug!("Notice: {}", notice.message);
        self.notices.push(notice);
    }

    pub async fn set_source(&mut self, location: Location) {
        self.state.set_source(location);
        self.check_and_plan_route().await;
    }

    pub async fn set_destination(&mut self, location: Location) {
        self.state.set_destination(location);
        self.check_and_plan_route().await;
    }

    pub async fn set_preference(&mut self, preference: RoutePreference) {
        self.state.set_preference(preference);
        self.check_and_plan_route().await;
    }

    /// Rebuild the day structure for `days` days, discarding all stops
    pub async fn set_day_count(&mut self, days: u8) -> Result<()> {
        self.state.set_day_count(days)?;
        self.check_and_plan_route().await;
        Ok(())
    }

    /// Apply the raw trip duration input. Invalid input leaves the state
    /// untouched and queues a notice.
    pub async fn set_trip_duration(&mut self, input: &str) -> Result<()> {
        let days = match parse_trip_duration(input) {
            Ok(days) => days,
            Err(e) => {
                self.notify(Notice::warning(INVALID_DURATION));
                return Err(e);
            }
        };
        self.set_day_count(days).await
    }

    /// Add an empty stop slot to a day
    pub fn add_stop(&mut self, day_index: usize) -> Result<StopId> {
        self.state.add_stop(day_index)
    }

    pub async fn set_stop(&mut self, id: StopId, location: Location) -> Result<()> {
        self.state.set_stop(id, location)?;
        self.check_and_plan_route().await;
        Ok(())
    }

    pub async fn remove_stop(&mut self, id: StopId) -> Result<Option<Stop>> {
        let removed = self.state.remove_stop(id)?;
        self.check_and_plan_route().await;
        Ok(removed)
    }

    /// Put a location into the field it was picked for
    pub async fn apply(&mut self, target: InputField, location: Location) -> Result<()> {
        match target {
            InputField::Source => self.set_source(location).await,
            InputField::Destination => self.set_destination(location).await,
            InputField::Stop(id) => self.set_stop(id, location).await?,
        }
        Ok(())
    }

    /// Search box submit: geocode the query and use the best match.
    ///
    /// An empty query does nothing. Lookup failures and empty results queue
    /// a notice and leave the trip unchanged.
    #[instrument(skip(self))]
    pub async fn search_location(
        &mut self,
        query: &str,
        target: InputField,
    ) -> Result<Option<Location>> {
        let resolved = LocationResolver::new(self.services.geocoder.as_ref())
            .resolve_query(query)
            .await;

        let location = match resolved {
            Ok(Some(location)) => location,
            Ok(None) => return Ok(None),
            Err(e @ TripPlannerError::NotFound { .. }) => {
                self.notify(Notice::warning(format!(
                    "No results for \"{}\". Try a more specific place name.",
                    query.trim()
                )));
                return Err(e);
            }
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", query, e);
                self.notify(Notice::error(GEOCODER_UNREACHABLE));
                return Err(e);
            }
        };

        self.remember(&location.name);
        self.apply(target, location.clone()).await?;
        Ok(Some(location))
    }

    /// An autocomplete suggestion was clicked
    pub async fn select_suggestion(
        &mut self,
        suggestion: GeocodeResult,
        target: InputField,
    ) -> Result<Location> {
        let location = suggestion.into_location();
        self.remember(&location.name);
        self.apply(target, location.clone()).await?;
        Ok(location)
    }

    /// A point on the map was chosen for a field
    pub async fn pick_on_map(&mut self, lat: f64, lng: f64, target: InputField) -> Result<Location> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(TripPlannerError::validation("Coordinates must be finite numbers"));
        }
        let location = LocationResolver::new(self.services.geocoder.as_ref())
            .resolve_coordinates(lat, lng)
            .await;
        self.apply(target, location.clone()).await?;
        Ok(location)
    }

    fn remember(&self, name: &str) {
        if let Some(saved) = &self.saved {
            if let Err(e) = saved.push_recent(name) {
                warn!("Could not record recent search: {}", e);
            }
        }
    }

    /// Re-plan the trip once source and destination are known.
    ///
    /// Reconciles the destination into the final day, then computes the
    /// route and collects recommendations concurrently. A routing failure
    /// keeps the previous estimate and queues a notice; a trip whose points
    /// all coincide has no route, but recommendations are still refreshed.
    #[instrument(skip(self))]
    pub async fn check_and_plan_route(&mut self) {
        if self.state.reconcile_destination() {
            debug!("Destination reconciled into the final day");
        }
        let Some(itinerary) = self.state.itinerary() else {
            debug!("Source or destination missing, nothing to plan");
            return;
        };
        // A round trip with no stops collapses to a single waypoint
        let waypoints = self.state.waypoints();

        let preference = self.state.preference();
        let router = Arc::clone(&self.services.router);
        let poi = Arc::clone(&self.services.poi);
        let config = Arc::clone(&self.config);
        let aggregator = RecommendationAggregator::new(poi.as_ref(), &config.recommendations);

        let route_request = async {
            match &waypoints {
                Some(points) => Some(
                    routing::plan_route(router.as_ref(), points, preference, &config.costs).await,
                ),
                None => None,
            }
        };
        let (route, recommendations, restaurants) = tokio::join!(
            route_request,
            aggregator.aggregate(&itinerary),
            aggregator.restaurants_near(&itinerary.destination),
        );

        match route {
            Some(Ok(estimate)) => self.route = Some(estimate),
            Some(Err(e)) => {
                warn!("Routing failed: {}", e);
                self.notify(Notice::error(ROUTE_FAILED));
            }
            None => {
                debug!("Source and destination coincide, no route to compute");
                self.route = None;
            }
        }
        info!(
            "Planned {} waypoints with {} recommendations",
            waypoints.as_ref().map_or(1, Vec::len),
            recommendations.len()
        );
        self.recommendations = recommendations;
        self.restaurants = restaurants;
    }

    /// Day-by-day plan for the current trip
    #[must_use]
    pub fn schedule(&self) -> Vec<DaySchedule> {
        self.itinerary()
            .map(|it| schedule::allocate(&it, &self.recommendations, &self.restaurants))
            .unwrap_or_default()
    }

    fn with_export_context<T>(&self, f: impl FnOnce(&ExportContext<'_>) -> Result<T>) -> Result<T> {
        let itinerary = self
            .itinerary()
            .ok_or_else(|| TripPlannerError::validation("Pick a source and a destination first"))?;
        let days = schedule::allocate(&itinerary, &self.recommendations, &self.restaurants);
        let ctx = ExportContext {
            itinerary: &itinerary,
            route: self.route.as_ref(),
            preference: self.state.preference(),
            schedule: &days,
            recommendations: &self.recommendations,
        };
        f(&ctx)
    }

    /// Pretty JSON export of the planned trip
    pub fn export_json(&self) -> Result<String> {
        self.with_export_context(|ctx| TripExport::new(ctx, Utc::now()).to_json())
    }

    /// PDF export of the planned trip
    pub fn export_pdf(&self) -> Result<Vec<u8>> {
        self.with_export_context(|ctx| export::pdf::render(&DocumentLayout::build(ctx)))
    }

    /// Back to an empty session
    pub fn clear(&mut self) {
        self.state.clear();
        self.route = None;
        self.recommendations.clear();
        self.restaurants.clear();
        self.notices.clear();
    }
}
