//! JSON/HTTP surface of the planner
//!
//! Planning endpoints are stateless: each request carries the whole trip and
//! gets a fresh [`TravelPlanner`] session. Saved places and autocomplete
//! state are shared across requests.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::autocomplete::{Autocomplete, FieldKind, InputField, SuggestOutcome};
use crate::config::TripPlannerConfig;
use crate::export::{JSON_FILE_NAME, PDF_FILE_NAME};
use crate::location_resolver::LocationResolver;
use crate::models::{Location, Recommendation, Restaurant};
use crate::planner::{
    DayStops, Notice, Services, StopId, TravelPlanner, TripState, parse_trip_duration,
};
use crate::routing::{RouteEstimate, RoutePreference};
use crate::saved_places::SavedPlaces;
use crate::schedule::DaySchedule;
use crate::services::GeocodeResult;
use crate::TripPlannerError;

/// Shared state of the HTTP API
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub config: Arc<TripPlannerConfig>,
    pub saved: SavedPlaces,
    pub autocomplete: Arc<Autocomplete>,
}

impl AppState {
    #[must_use]
    pub fn new(services: Services, config: Arc<TripPlannerConfig>, saved: SavedPlaces) -> Self {
        let autocomplete = Arc::new(Autocomplete::new(Arc::clone(&services.geocoder)));
        Self {
            services,
            config,
            saved,
            autocomplete,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/plan", post(plan))
        .route("/export/json", post(export_json))
        .route("/export/pdf", post(export_pdf))
        .route("/geocode", get(geocode))
        .route("/reverse", get(reverse))
        .route("/suggest", get(suggest))
        .route("/recent", get(recent))
        .route("/favorites", get(favorites))
        .route("/favorites/toggle", post(toggle_favorite))
        .with_state(state)
}

/// Error body: `{"error": "..."}` with a status derived from the error kind
pub struct ApiError(TripPlannerError);

impl From<TripPlannerError> for ApiError {
    fn from(err: TripPlannerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TripPlannerError::Validation { .. } => StatusCode::BAD_REQUEST,
            TripPlannerError::NotFound { .. } => StatusCode::NOT_FOUND,
            TripPlannerError::Api { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        }
        let body = Json(serde_json::json!({ "error": self.0.user_message() }));
        (status, body).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// A location as sent by the client; ids are assigned server-side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceInput {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

impl PlaceInput {
    fn into_location(self) -> ApiResult<Location> {
        let location = Location::new(self.lat, self.lng, self.name);
        if !location.has_coordinates() {
            return Err(TripPlannerError::validation("Coordinates must be finite numbers").into());
        }
        Ok(location)
    }
}

/// Trip duration as typed: a number or a string
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationInput {
    Days(i64),
    Text(String),
}

impl DurationInput {
    fn as_text(&self) -> String {
        match self {
            DurationInput::Days(days) => days.to_string(),
            DurationInput::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub source: PlaceInput,
    pub destination: PlaceInput,
    #[serde(default)]
    pub trip_duration: Option<DurationInput>,
    #[serde(default)]
    pub preference: RoutePreference,
    /// User stops per day; without a trip duration only the first day is used
    #[serde(default)]
    pub days: Vec<Vec<PlaceInput>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub route: Option<RouteEstimate>,
    pub days: Vec<DayStops>,
    pub recommendations: Vec<Recommendation>,
    pub restaurants: Vec<Restaurant>,
    pub schedule: Vec<DaySchedule>,
    pub notices: Vec<Notice>,
}

/// Assemble the trip state described by a request
fn build_state(request: PlanRequest) -> ApiResult<TripState> {
    let mut state = TripState::new();
    state.set_preference(request.preference);
    state.set_source(request.source.into_location()?);

    if let Some(duration) = &request.trip_duration {
        state.set_day_count(parse_trip_duration(&duration.as_text())?)?;
    }

    for (day_index, stops) in request.days.into_iter().enumerate() {
        if day_index >= state.days().len() {
            return Err(TripPlannerError::validation(format!(
                "Stops given for day {} but the trip has {} days",
                day_index + 1,
                state.days().len()
            ))
            .into());
        }
        for (stop_index, stop) in stops.into_iter().enumerate() {
            let id = if stop_index < state.days()[day_index].len() {
                StopId::new(day_index, stop_index)
            } else {
                state.add_stop(day_index)?
            };
            state.set_stop(id, stop.into_location()?)?;
        }
    }

    // Setting the destination last reconciles it into the final day
    state.set_destination(request.destination.into_location()?);
    Ok(state)
}

async fn planned_session(app: &AppState, request: PlanRequest) -> ApiResult<TravelPlanner> {
    let state = build_state(request)?;
    let mut planner = TravelPlanner::with_state(state, app.services.clone(), Arc::clone(&app.config))
        .with_saved_places(app.saved.clone());
    planner.check_and_plan_route().await;
    Ok(planner)
}

async fn plan(
    State(app): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> ApiResult<Json<PlanResponse>> {
    let mut planner = planned_session(&app, request).await?;
    let schedule = planner.schedule();
    let notices = planner.take_notices();
    Ok(Json(PlanResponse {
        route: planner.route().cloned(),
        days: planner.state().days().to_vec(),
        recommendations: planner.recommendations().to_vec(),
        restaurants: planner.restaurants().to_vec(),
        schedule,
        notices,
    }))
}

fn attachment(file_name: &str) -> String {
    format!("attachment; filename=\"{file_name}\"")
}

async fn export_json(
    State(app): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> ApiResult<Response> {
    let planner = planned_session(&app, request).await?;
    let body = planner.export_json()?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, attachment(JSON_FILE_NAME)),
        ],
        body,
    )
        .into_response())
}

async fn export_pdf(
    State(app): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> ApiResult<Response> {
    let planner = planned_session(&app, request).await?;
    let bytes = planner.export_pdf()?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, attachment(PDF_FILE_NAME)),
        ],
        bytes,
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
    #[serde(default)]
    pub q: String,
}

/// Best match for a search query; `null` for an empty query
async fn geocode(
    State(app): State<AppState>,
    Query(params): Query<GeocodeParams>,
) -> ApiResult<Json<Option<Location>>> {
    let location = LocationResolver::new(app.services.geocoder.as_ref())
        .resolve_query(&params.q)
        .await?;
    if let Some(location) = &location {
        if let Err(e) = app.saved.push_recent(&location.name) {
            warn!("Could not record recent search: {}", e);
        }
    }
    Ok(Json(location))
}

#[derive(Debug, Deserialize)]
pub struct ReverseParams {
    pub lat: f64,
    pub lng: f64,
}

async fn reverse(
    State(app): State<AppState>,
    Query(params): Query<ReverseParams>,
) -> ApiResult<Json<Location>> {
    if !params.lat.is_finite() || !params.lng.is_finite() {
        return Err(TripPlannerError::validation("Coordinates must be finite numbers").into());
    }
    let location = LocationResolver::new(app.services.geocoder.as_ref())
        .resolve_coordinates(params.lat, params.lng)
        .await;
    Ok(Json(location))
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    pub field: FieldKind,
    /// Day of a stop field
    pub day: Option<usize>,
    /// Slot of a stop field within its day
    pub stop: Option<usize>,
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    /// `suggestions`, `cleared` or `superseded`
    pub status: &'static str,
    pub results: Vec<GeocodeResult>,
}

async fn suggest(
    State(app): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> ApiResult<Json<SuggestResponse>> {
    let field = InputField::from_parts(params.field, params.day, params.stop)?;
    let response = match app.autocomplete.on_input(field, &params.q).await? {
        SuggestOutcome::Suggestions(results) => SuggestResponse {
            status: "suggestions",
            results,
        },
        SuggestOutcome::Cleared => SuggestResponse {
            status: "cleared",
            results: Vec::new(),
        },
        SuggestOutcome::Superseded => SuggestResponse {
            status: "superseded",
            results: Vec::new(),
        },
    };
    Ok(Json(response))
}

async fn recent(State(app): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(app.saved.recent()?))
}

async fn favorites(State(app): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(app.saved.favorites()?))
}

#[derive(Debug, Deserialize)]
pub struct ToggleFavorite {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct FavoriteStatus {
    pub name: String,
    pub favorite: bool,
}

async fn toggle_favorite(
    State(app): State<AppState>,
    Json(request): Json<ToggleFavorite>,
) -> ApiResult<Json<FavoriteStatus>> {
    let favorite = app.saved.toggle_favorite(&request.name)?;
    Ok(Json(FavoriteStatus {
        name: request.name.trim().to_string(),
        favorite,
    }))
}
