//! In-memory stand-ins for the map services

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tripplanner::config::TripPlannerConfig;
use tripplanner::models::Location;
use tripplanner::planner::{Services, TravelPlanner};
use tripplanner::services::{
    GeocodeResult, Geocoder, PoiCategory, PoiElement, PoiQuery, PoiService, RouteSummary,
    RoutingService,
};
use tripplanner::{Result, TripPlannerError};

pub const MUMBAI: (f64, f64) = (19.076, 72.8777);
pub const PUNE: (f64, f64) = (18.5204, 73.8567);
pub const LONAVALA: (f64, f64) = (18.7546, 73.4062);
pub const NASHIK: (f64, f64) = (19.9975, 73.7898);

pub fn place(name: &str, (lat, lng): (f64, f64)) -> GeocodeResult {
    GeocodeResult {
        lat,
        lng,
        display_name: format!("{name}, Maharashtra, India"),
        country: Some("India".to_string()),
    }
}

pub struct FakeGeocoder {
    pub places: Vec<GeocodeResult>,
    pub unreachable: AtomicBool,
}

impl Default for FakeGeocoder {
    fn default() -> Self {
        Self {
            places: vec![
                place("Mumbai", MUMBAI),
                place("Pune", PUNE),
                place("Lonavala", LONAVALA),
                place("Nashik", NASHIK),
            ],
            unreachable: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeResult>> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(TripPlannerError::api("connection refused"));
        }
        let needle = query.to_lowercase();
        Ok(self
            .places
            .iter()
            .filter(|p| p.display_name.to_lowercase().starts_with(&needle))
            .cloned()
            .collect())
    }

    async fn reverse(&self, lat: f64, lng: f64) -> Result<Option<GeocodeResult>> {
        Ok(self
            .places
            .iter()
            .find(|p| (p.lat - lat).abs() < 0.05 && (p.lng - lng).abs() < 0.05)
            .cloned())
    }
}

/// Router returning a fixed distance and recording every request
#[derive(Default)]
pub struct FakeRouter {
    pub distance_m: f64,
    pub duration_s: f64,
    pub fail: AtomicBool,
    pub requests: Mutex<Vec<Vec<(f64, f64)>>>,
}

impl FakeRouter {
    pub fn new(distance_m: f64, duration_s: f64) -> Self {
        Self {
            distance_m,
            duration_s,
            ..Default::default()
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Vec<(f64, f64)> {
        self.requests.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl RoutingService for FakeRouter {
    async fn route(&self, waypoints: &[Location]) -> Result<RouteSummary> {
        self.requests
            .lock()
            .unwrap()
            .push(waypoints.iter().map(|w| (w.lat, w.lng)).collect());
        if self.fail.load(Ordering::SeqCst) {
            return Err(TripPlannerError::api("Routing failed (NoRoute)"));
        }
        Ok(RouteSummary {
            distance_m: self.distance_m,
            duration_s: self.duration_s,
        })
    }
}

/// Two sights and one restaurant around every query point
#[derive(Default)]
pub struct FakePoi {
    pub calls: AtomicUsize,
}

fn element(id: u64, lat: f64, lng: f64, tags: &[(&str, String)]) -> PoiElement {
    PoiElement {
        id,
        lat,
        lng,
        tags: tags
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect::<BTreeMap<_, _>>(),
    }
}

#[async_trait]
impl PoiService for FakePoi {
    async fn nearby(&self, query: &PoiQuery) -> Result<Vec<PoiElement>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let tag = format!("{:.2}", query.lat);
        Ok(match query.category {
            PoiCategory::Sightseeing => vec![
                element(
                    1,
                    query.lat + 0.01,
                    query.lng,
                    &[("name", format!("Museum {tag}")), ("tourism", "museum".into())],
                ),
                element(
                    2,
                    query.lat - 0.01,
                    query.lng,
                    &[("name", format!("Fort {tag}")), ("historic", "fort".into())],
                ),
            ],
            PoiCategory::Restaurants => vec![element(
                3,
                query.lat,
                query.lng + 0.01,
                &[("name", format!("Diner {tag}")), ("amenity", "restaurant".into())],
            )],
        })
    }
}

pub struct Fakes {
    pub geocoder: Arc<FakeGeocoder>,
    pub router: Arc<FakeRouter>,
    pub poi: Arc<FakePoi>,
}

impl Fakes {
    pub fn new() -> Self {
        Self {
            geocoder: Arc::new(FakeGeocoder::default()),
            router: Arc::new(FakeRouter::new(148_600.0, 3.0 * 3600.0)),
            poi: Arc::new(FakePoi::default()),
        }
    }

    pub fn services(&self) -> Services {
        Services {
            geocoder: self.geocoder.clone(),
            router: self.router.clone(),
            poi: self.poi.clone(),
        }
    }

    pub fn planner(&self) -> TravelPlanner {
        TravelPlanner::new(self.services(), Arc::new(TripPlannerConfig::default()))
    }
}

pub fn location(name: &str, (lat, lng): (f64, f64)) -> Location {
    Location::new(lat, lng, name)
}
