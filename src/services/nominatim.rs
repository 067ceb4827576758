//! Nominatim geocoding client

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::http::check_status;
use super::{GeocodeResult, Geocoder};
use crate::config::ServicesConfig;
use crate::{Result, TripPlannerError};

const SEARCH_LIMIT: u32 = 5;

pub struct NominatimClient {
    client: ClientWithMiddleware,
    base_url: String,
}

/// Search/reverse item as returned with `format=jsonv2`
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    country: Option<String>,
    country_code: Option<String>,
}

/// Reverse lookups answer `{"error": ...}` for points in the sea and similar
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReverseResponse {
    Place(NominatimPlace),
    Error { error: String },
}

impl NominatimPlace {
    fn into_result(self) -> Result<GeocodeResult> {
        let lat = self
            .lat
            .parse::<f64>()
            .map_err(|_| TripPlannerError::api(format!("Invalid latitude: {}", self.lat)))?;
        let lng = self
            .lon
            .parse::<f64>()
            .map_err(|_| TripPlannerError::api(format!("Invalid longitude: {}", self.lon)))?;
        let country = self
            .address
            .and_then(|a| a.country.or(a.country_code));

        Ok(GeocodeResult {
            lat,
            lng,
            display_name: self
                .display_name
                .unwrap_or_else(|| format!("{lat:.5}, {lng:.5}")),
            country,
        })
    }
}

impl NominatimClient {
    #[must_use]
    pub fn new(client: ClientWithMiddleware, config: &ServicesConfig) -> Self {
        Self {
            client,
            base_url: config.nominatim_url.trim_end_matches('/').to_string(),
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?format=jsonv2&addressdetails=1&q={}&limit={SEARCH_LIMIT}",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    fn reverse_url(&self, lat: f64, lng: f64) -> String {
        format!(
            "{}/reverse?format=jsonv2&addressdetails=1&lat={lat}&lon={lng}",
            self.base_url
        )
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<GeocodeResult>> {
        let response = self
            .client
            .get(self.search_url(query))
            .header("Accept", "application/json")
            .send()
            .await?;
        let places: Vec<NominatimPlace> = check_status("Nominatim", response).await?.json().await?;
        debug!("Nominatim returned {} matches", places.len());

        places.into_iter().map(NominatimPlace::into_result).collect()
    }

    #[instrument(skip(self))]
    async fn reverse(&self, lat: f64, lng: f64) -> Result<Option<GeocodeResult>> {
        let response = self
            .client
            .get(self.reverse_url(lat, lng))
            .header("Accept", "application/json")
            .send()
            .await?;
        let reverse: ReverseResponse = check_status("Nominatim", response).await?.json().await?;

        match reverse {
            ReverseResponse::Place(place) => place.into_result().map(Some),
            ReverseResponse::Error { error } => {
                debug!("Reverse geocoding found nothing: {}", error);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::http::build_client;

    fn client() -> NominatimClient {
        let config = ServicesConfig::default();
        NominatimClient::new(build_client(&config).unwrap(), &config)
    }

    #[test]
    fn test_search_url_encodes_query() {
        let url = client().search_url("Gateway of India, Mumbai");
        assert_eq!(
            url,
            "https://nominatim.openstreetmap.org/search?format=jsonv2&addressdetails=1&q=Gateway%20of%20India%2C%20Mumbai&limit=5"
        );
    }

    #[test]
    fn test_reverse_url() {
        let url = client().reverse_url(18.5204, 73.8567);
        assert!(url.ends_with("/reverse?format=jsonv2&addressdetails=1&lat=18.5204&lon=73.8567"));
    }

    #[test]
    fn test_place_conversion() {
        let json = r#"{"lat":"19.0760","lon":"72.8777","display_name":"Mumbai, Maharashtra, India","address":{"country_code":"in"}}"#;
        let place: NominatimPlace = serde_json::from_str(json).unwrap();
        let result = place.into_result().unwrap();
        assert_eq!(result.lat, 19.076);
        assert_eq!(result.lng, 72.8777);
        assert_eq!(result.display_name, "Mumbai, Maharashtra, India");
        assert_eq!(result.country.as_deref(), Some("in"));
    }

    #[test]
    fn test_reverse_error_payload() {
        let reverse: ReverseResponse =
            serde_json::from_str(r#"{"error":"Unable to geocode"}"#).unwrap();
        assert!(matches!(reverse, ReverseResponse::Error { .. }));
    }

    #[test]
    fn test_invalid_coordinates_are_api_errors() {
        let place = NominatimPlace {
            lat: "north".to_string(),
            lon: "1.0".to_string(),
            display_name: None,
            address: None,
        };
        assert!(matches!(place.into_result(), Err(TripPlannerError::Api { .. })));
    }
}
