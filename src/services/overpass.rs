//! Overpass points-of-interest client

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

use super::http::check_status;
use super::{PoiCategory, PoiElement, PoiQuery, PoiService};
use crate::cache;
use crate::config::ServicesConfig;
use crate::{Result, TripPlannerError};

pub struct OverpassClient {
    client: ClientWithMiddleware,
    interpreter_url: String,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    id: u64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

impl OverpassElement {
    /// Nodes carry lat/lon directly, ways and relations only a center
    fn into_poi(self) -> Option<PoiElement> {
        let (lat, lng) = match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => (lat, lon),
            (_, _, Some(center)) => (center.lat, center.lon),
            _ => return None,
        };
        Some(PoiElement {
            id: self.id,
            lat,
            lng,
            tags: self.tags,
        })
    }
}

/// Overpass QL for a radius query
#[must_use]
pub fn build_query(query: &PoiQuery) -> String {
    let around = format!("(around:{},{},{})", query.radius_m, query.lat, query.lng);
    let filters = match query.category {
        PoiCategory::Sightseeing => format!(
            "node[\"tourism\"~\"attraction|museum|gallery|zoo|theme_park\"]{around};\n\
             node[\"historic\"]{around};\n\
             node[\"leisure\"=\"park\"]{around};"
        ),
        PoiCategory::Restaurants => format!("node[\"amenity\"=\"restaurant\"]{around};"),
    };
    format!(
        "[out:json][timeout:25];\n(\n{filters}\n);\nout center {};",
        query.limit
    )
}

fn cache_key(query: &PoiQuery) -> String {
    format!(
        "{}:{:.3}:{:.3}:{}:{}",
        query.category.cache_prefix(),
        query.lat,
        query.lng,
        query.radius_m,
        query.limit
    )
}

impl OverpassClient {
    #[must_use]
    pub fn new(client: ClientWithMiddleware, config: &ServicesConfig) -> Self {
        Self {
            client,
            interpreter_url: config.overpass_url.clone(),
        }
    }

    async fn fetch(&self, query: &PoiQuery) -> Result<Vec<PoiElement>> {
        let response = self
            .client
            .post(&self.interpreter_url)
            .header("Content-Type", "text/plain")
            .body(build_query(query))
            .send()
            .await?;
        let parsed: OverpassResponse = check_status("Overpass", response).await?.json().await?;

        Ok(parsed
            .elements
            .into_iter()
            .filter_map(OverpassElement::into_poi)
            .collect())
    }
}

#[async_trait]
impl PoiService for OverpassClient {
    #[instrument(skip(self), fields(category = ?query.category))]
    async fn nearby(&self, query: &PoiQuery) -> Result<Vec<PoiElement>> {
        if !query.lat.is_finite() || !query.lng.is_finite() {
            return Err(TripPlannerError::validation("POI query without coordinates"));
        }

        let key = cache_key(query);
        match cache::get::<Vec<PoiElement>>(&key).await {
            Ok(Some(cached)) => {
                debug!("Serving {} places from cache", cached.len());
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => warn!("POI cache read failed: {}", e),
        }

        let elements = self.fetch(query).await?;
        info!("Overpass returned {} places", elements.len());

        if let Err(e) = cache::put(&key, elements.clone(), cache::jittered(cache::POI_TTL)).await {
            warn!("POI cache write failed: {}", e);
        }
        Ok(elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(category: PoiCategory, radius_m: u32) -> PoiQuery {
        PoiQuery {
            lat: 19.076,
            lng: 72.8777,
            radius_m,
            limit: 15,
            category,
        }
    }

    #[test]
    fn test_sightseeing_query() {
        let ql = build_query(&query(PoiCategory::Sightseeing, 5000));
        assert!(ql.starts_with("[out:json][timeout:25];"));
        assert!(ql.contains(
            "node[\"tourism\"~\"attraction|museum|gallery|zoo|theme_park\"](around:5000,19.076,72.8777);"
        ));
        assert!(ql.contains("node[\"historic\"](around:5000,19.076,72.8777);"));
        assert!(ql.contains("node[\"leisure\"=\"park\"](around:5000,19.076,72.8777);"));
        assert!(ql.ends_with("out center 15;"));
    }

    #[test]
    fn test_restaurant_query() {
        let ql = build_query(&query(PoiCategory::Restaurants, 2000));
        assert!(ql.contains("node[\"amenity\"=\"restaurant\"](around:2000,19.076,72.8777);"));
        assert!(!ql.contains("tourism"));
    }

    #[test]
    fn test_cache_keys_differ_by_category() {
        assert_ne!(
            cache_key(&query(PoiCategory::Sightseeing, 2000)),
            cache_key(&query(PoiCategory::Restaurants, 2000))
        );
    }

    #[test]
    fn test_elements_parse_nodes_and_centers() {
        let json = r#"{"elements":[
            {"type":"node","id":1,"lat":18.92,"lon":72.83,"tags":{"name":"Gateway of India","tourism":"attraction"}},
            {"type":"way","id":2,"center":{"lat":18.93,"lon":72.84},"tags":{"leisure":"park"}},
            {"type":"relation","id":3}
        ]}"#;
        let response: OverpassResponse = serde_json::from_str(json).unwrap();
        let pois: Vec<_> = response
            .elements
            .into_iter()
            .filter_map(OverpassElement::into_poi)
            .collect();

        assert_eq!(pois.len(), 2);
        assert_eq!(pois[0].tag("name"), Some("Gateway of India"));
        assert_eq!(pois[1].lat, 18.93);
        assert!(pois[1].tag("name").is_none());
    }
}
