//! Recommendation aggregation
//!
//! Fetches nearby places for the source, every stop and the destination,
//! tags each with the area it was found near, and merges the results in
//! source → stops → destination order with duplicates removed.

use futures::future::join_all;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::config::RecommendationsConfig;
use crate::models::{Area, AreaKind, Location, LocationId, Recommendation, Restaurant, icon_for};
use crate::planner::Itinerary;
use crate::services::{PoiCategory, PoiElement, PoiQuery, PoiService};

const UNNAMED_PLACE: &str = "Unnamed Place";

/// Display name: "local (english)" when both exist and differ
#[must_use]
pub fn display_name(element: &PoiElement) -> String {
    match (element.tag("name"), element.tag("name:en")) {
        (Some(local), Some(english)) if local != english => format!("{local} ({english})"),
        (Some(local), _) => local.to_string(),
        (None, Some(english)) => english.to_string(),
        (None, None) => UNNAMED_PLACE.to_string(),
    }
}

/// First non-empty of the tourism, historic and leisure tags
#[must_use]
pub fn place_type(element: &PoiElement) -> String {
    element
        .tag("tourism")
        .or_else(|| element.tag("historic"))
        .or_else(|| element.tag("leisure"))
        .unwrap_or("place")
        .to_string()
}

#[must_use]
pub fn describe(element: &PoiElement) -> String {
    if let Some(description) = element.tag("description") {
        return description.to_string();
    }
    if element.tag("historic").is_some() {
        "Historic site".to_string()
    } else if element.tag("tourism").is_some() {
        "Tourist attraction".to_string()
    } else if element.tag("leisure").is_some() {
        "Leisure spot".to_string()
    } else {
        "Nearby place".to_string()
    }
}

#[must_use]
pub fn to_recommendation(element: &PoiElement, area: &Area) -> Recommendation {
    let kind = place_type(element);
    Recommendation {
        name: display_name(element),
        icon: icon_for(&kind).to_string(),
        kind,
        description: describe(element),
        lat: element.lat,
        lng: element.lng,
        area: area.label.clone(),
        area_id: area.id,
        area_kind: area.kind,
    }
}

#[must_use]
pub fn to_restaurant(element: &PoiElement) -> Restaurant {
    Restaurant {
        name: display_name(element),
        lat: element.lat,
        lng: element.lng,
        cuisine: element.tag("cuisine").map(str::to_string),
    }
}

/// Drop later entries describing the same place
#[must_use]
pub fn dedupe(recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
    let mut seen = HashSet::new();
    recommendations
        .into_iter()
        .filter(|rec| seen.insert(rec.place_key()))
        .collect()
}

/// A run of recommendations sharing an originating area
#[derive(Debug, Clone, PartialEq)]
pub struct AreaGroup<'a> {
    pub area_id: LocationId,
    pub label: &'a str,
    pub recommendations: Vec<&'a Recommendation>,
}

/// Group by area, in order of first appearance
#[must_use]
pub fn group_by_area(recommendations: &[Recommendation]) -> Vec<AreaGroup<'_>> {
    let mut groups: Vec<AreaGroup<'_>> = Vec::new();
    for rec in recommendations {
        match groups.iter_mut().find(|g| g.area_id == rec.area_id) {
            Some(group) => group.recommendations.push(rec),
            None => groups.push(AreaGroup {
                area_id: rec.area_id,
                label: &rec.area,
                recommendations: vec![rec],
            }),
        }
    }
    groups
}

/// Which part of the itinerary a recommendation belongs to, joined by id
#[must_use]
pub fn classify(rec: &Recommendation, itinerary: &Itinerary) -> Option<AreaKind> {
    if rec.area_id == itinerary.source.id {
        Some(AreaKind::Source)
    } else if rec.area_id == itinerary.destination.id {
        Some(AreaKind::Destination)
    } else if itinerary.stops().iter().any(|s| s.id == rec.area_id) {
        Some(AreaKind::Stop)
    } else {
        None
    }
}

/// Fetches and merges recommendations for a whole itinerary
pub struct RecommendationAggregator<'a> {
    poi: &'a dyn PoiService,
    config: &'a RecommendationsConfig,
}

impl<'a> RecommendationAggregator<'a> {
    #[must_use]
    pub fn new(poi: &'a dyn PoiService, config: &'a RecommendationsConfig) -> Self {
        Self { poi, config }
    }

    /// Areas to query, in merge order. Stops that are the source or the
    /// destination themselves are queried once, under their primary role.
    #[must_use]
    pub fn areas(itinerary: &Itinerary) -> Vec<(Location, Area)> {
        let mut seen = HashSet::new();
        let mut areas = Vec::new();
        let mut push = |location: &Location, kind: AreaKind| {
            if seen.insert(location.id) {
                areas.push((location.clone(), Area::for_location(location, kind)));
            }
        };

        push(&itinerary.source, AreaKind::Source);
        let destination_id = itinerary.destination.id;
        for stop in itinerary.stops() {
            if stop.id != destination_id {
                push(stop, AreaKind::Stop);
            }
        }
        push(&itinerary.destination, AreaKind::Destination);
        areas
    }

    /// Recommendations for every area of the itinerary.
    ///
    /// Lookups run concurrently; a failed lookup contributes nothing and the
    /// merged order stays source → stops → destination.
    pub async fn aggregate(&self, itinerary: &Itinerary) -> Vec<Recommendation> {
        let areas = Self::areas(itinerary);
        let lookups = areas
            .iter()
            .map(|(location, area)| self.nearby_for(location, area));
        let per_area = join_all(lookups).await;

        let merged = dedupe(per_area.into_iter().flatten().collect());
        info!(
            "Collected {} recommendations across {} areas",
            merged.len(),
            areas.len()
        );
        merged
    }

    /// Recommendations near one location; failures yield an empty list
    pub async fn nearby_for(&self, location: &Location, area: &Area) -> Vec<Recommendation> {
        if !location.has_coordinates() {
            debug!("{} has no coordinates, skipping lookup", location.name);
            return Vec::new();
        }

        let query = PoiQuery {
            lat: location.lat,
            lng: location.lng,
            radius_m: self.config.radius_m,
            limit: self.config.max_results,
            category: PoiCategory::Sightseeing,
        };

        match self.poi.nearby(&query).await {
            Ok(elements) => elements
                .iter()
                .map(|element| to_recommendation(element, area))
                .collect(),
            Err(e) => {
                warn!("Recommendation lookup near {} failed: {}", location.name, e);
                Vec::new()
            }
        }
    }

    /// Restaurants around a location; failures yield an empty list
    pub async fn restaurants_near(&self, location: &Location) -> Vec<Restaurant> {
        if !location.has_coordinates() {
            return Vec::new();
        }

        let query = PoiQuery {
            lat: location.lat,
            lng: location.lng,
            radius_m: self.config.restaurant_radius_m,
            limit: self.config.max_results,
            category: PoiCategory::Restaurants,
        };

        match self.poi.nearby(&query).await {
            Ok(elements) => elements.iter().map(to_restaurant).collect(),
            Err(e) => {
                warn!("Restaurant lookup near {} failed: {}", location.name, e);
                Vec::new()
            }
        }
    }
}
