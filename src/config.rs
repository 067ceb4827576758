//! Configuration management for the trip planner
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TripPlannerError;
use crate::routing::RoutePreference;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the trip planner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPlannerConfig {
    /// External map service endpoints and HTTP behaviour
    #[serde(default)]
    pub services: ServicesConfig,
    /// Points-of-interest lookup settings
    #[serde(default)]
    pub recommendations: RecommendationsConfig,
    /// Cost-per-km table used for trip cost estimates
    #[serde(default)]
    pub costs: CostsConfig,
    /// Durable store locations
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP API server settings
    #[serde(default)]
    pub web: WebConfig,
}

/// External service configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Nominatim base URL (forward and reverse geocoding)
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,
    /// OSRM base URL (road routing)
    #[serde(default = "default_osrm_url")]
    pub osrm_url: String,
    /// Overpass interpreter URL (points of interest)
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Points-of-interest lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsConfig {
    /// Search radius around each location in meters
    #[serde(default = "default_poi_radius")]
    pub radius_m: u32,
    /// Maximum number of places returned per location
    #[serde(default = "default_poi_limit")]
    pub max_results: u32,
    /// Search radius for restaurants in meters
    #[serde(default = "default_restaurant_radius")]
    pub restaurant_radius_m: u32,
}

/// Cost per kilometer for each route preference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostsConfig {
    #[serde(default = "default_cost_default")]
    pub default_per_km: u32,
    #[serde(default = "default_cost_cheapest")]
    pub cheapest_per_km: u32,
    #[serde(default = "default_cost_scenic")]
    pub scenic_per_km: u32,
}

/// Durable store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the saved-places keyspace
    #[serde(default = "default_storage_location")]
    pub location: String,
    /// Directory holding the response cache
    #[serde(default = "default_cache_location")]
    pub cache_location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// HTTP API server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory with the static browser front end
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

// Default value functions
fn default_nominatim_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_osrm_url() -> String {
    "https://router.project-osrm.org".to_string()
}

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_user_agent() -> String {
    format!("TripPlanner/{}", crate::VERSION)
}

fn default_poi_radius() -> u32 {
    5000
}

fn default_poi_limit() -> u32 {
    15
}

fn default_restaurant_radius() -> u32 {
    2000
}

fn default_cost_default() -> u32 {
    10
}

fn default_cost_cheapest() -> u32 {
    6
}

fn default_cost_scenic() -> u32 {
    8
}

fn default_storage_location() -> String {
    "~/.local/share/tripplanner/places".to_string()
}

fn default_cache_location() -> String {
    "~/.cache/tripplanner".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> String {
    "frontend/dist".to_string()
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            nominatim_url: default_nominatim_url(),
            osrm_url: default_osrm_url(),
            overpass_url: default_overpass_url(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for RecommendationsConfig {
    fn default() -> Self {
        Self {
            radius_m: default_poi_radius(),
            max_results: default_poi_limit(),
            restaurant_radius_m: default_restaurant_radius(),
        }
    }
}

impl Default for CostsConfig {
    fn default() -> Self {
        Self {
            default_per_km: default_cost_default(),
            cheapest_per_km: default_cost_cheapest(),
            scenic_per_km: default_cost_scenic(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            location: default_storage_location(),
            cache_location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for TripPlannerConfig {
    fn default() -> Self {
        Self {
            services: ServicesConfig::default(),
            recommendations: RecommendationsConfig::default(),
            costs: CostsConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
            web: WebConfig::default(),
        }
    }
}

impl CostsConfig {
    /// Cost per kilometer for the given route preference
    #[must_use]
    pub fn per_km(&self, preference: RoutePreference) -> u32 {
        match preference {
            RoutePreference::Default => self.default_per_km,
            RoutePreference::Cheapest => self.cheapest_per_km,
            RoutePreference::Scenic => self.scenic_per_km,
        }
    }
}

impl TripPlannerConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        let path = std::env::var_os("TRIPPLANNER_CONFIG").map(PathBuf::from);
        Self::load_from_path(path)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRIPPLANNER_SERVICES__OSRM_URL=... overrides services.osrm_url
        builder = builder.add_source(
            Environment::with_prefix("TRIPPLANNER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripPlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripplanner").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.services.nominatim_url.is_empty() {
            self.services.nominatim_url = default_nominatim_url();
        }
        if self.services.osrm_url.is_empty() {
            self.services.osrm_url = default_osrm_url();
        }
        if self.services.overpass_url.is_empty() {
            self.services.overpass_url = default_overpass_url();
        }
        if self.services.timeout_seconds == 0 {
            self.services.timeout_seconds = default_timeout();
        }
        if self.services.user_agent.is_empty() {
            self.services.user_agent = default_user_agent();
        }
        if self.recommendations.radius_m == 0 {
            self.recommendations.radius_m = default_poi_radius();
        }
        if self.recommendations.max_results == 0 {
            self.recommendations.max_results = default_poi_limit();
        }
        if self.recommendations.restaurant_radius_m == 0 {
            self.recommendations.restaurant_radius_m = default_restaurant_radius();
        }
        if self.storage.location.is_empty() {
            self.storage.location = default_storage_location();
        }
        if self.storage.cache_location.is_empty() {
            self.storage.cache_location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.services.timeout_seconds > 300 {
            return Err(
                TripPlannerError::config("Service timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.services.max_retries > 10 {
            return Err(TripPlannerError::config("Service max retries cannot exceed 10").into());
        }

        if self.recommendations.radius_m > 50_000 {
            return Err(
                TripPlannerError::config("Recommendation radius cannot exceed 50000 m").into(),
            );
        }

        if self.recommendations.max_results > 100 {
            return Err(TripPlannerError::config(
                "Maximum recommendations per location cannot exceed 100",
            )
            .into());
        }

        if self.costs.default_per_km == 0
            || self.costs.cheapest_per_km == 0
            || self.costs.scenic_per_km == 0
        {
            return Err(TripPlannerError::config("Cost per km must be positive").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripPlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripPlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Nominatim", &self.services.nominatim_url),
            ("OSRM", &self.services.osrm_url),
            ("Overpass", &self.services.overpass_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripPlannerError::config(format!(
                    "{name} URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

/// Expand a leading `~/` to the user's home directory
#[must_use]
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TripPlannerConfig::default();
        assert_eq!(config.services.osrm_url, "https://router.project-osrm.org");
        assert_eq!(config.services.timeout_seconds, 30);
        assert_eq!(config.recommendations.radius_m, 5000);
        assert_eq!(config.recommendations.restaurant_radius_m, 2000);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cost_table_matches_preferences() {
        let costs = CostsConfig::default();
        assert_eq!(costs.per_km(RoutePreference::Default), 10);
        assert_eq!(costs.per_km(RoutePreference::Cheapest), 6);
        assert_eq!(costs.per_km(RoutePreference::Scenic), 8);
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TripPlannerConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TripPlannerConfig::default();
        config.services.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_rejects_non_http_url() {
        let mut config = TripPlannerConfig::default();
        config.services.overpass_url = "ftp://example.org".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Overpass URL"));
    }

    #[test]
    fn test_apply_defaults_fills_zeroes() {
        let mut config = TripPlannerConfig::default();
        config.services.timeout_seconds = 0;
        config.recommendations.radius_m = 0;
        config.logging.format = String::new();
        config.apply_defaults();
        assert_eq!(config.services.timeout_seconds, 30);
        assert_eq!(config.recommendations.radius_m, 5000);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[costs]\ncheapest_per_km = 5\n\n[web]\nport = 9000").unwrap();

        let config = TripPlannerConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.costs.cheapest_per_km, 5);
        assert_eq!(config.costs.default_per_km, 10);
        assert_eq!(config.web.port, 9000);
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = TripPlannerConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("tripplanner"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }

    #[test]
    fn test_expand_home_keeps_absolute_paths() {
        assert_eq!(expand_home("/tmp/places"), PathBuf::from("/tmp/places"));
    }
}
