use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use tripplanner::api::AppState;
use tripplanner::config::{TripPlannerConfig, expand_home};
use tripplanner::planner::Services;
use tripplanner::saved_places::{FjallStore, SavedPlaces};
use tripplanner::services::{NominatimClient, OsrmClient, OverpassClient, http};
use tripplanner::{cache, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = TripPlannerConfig::load().context("Failed to load configuration")?;
    logging::init(&config.logging)?;
    info!("Starting tripplanner {}", tripplanner::VERSION);

    let cache_dir = expand_home(&config.storage.cache_location);
    if let Err(e) = cache::init(&cache_dir) {
        warn!("Response cache disabled ({}): {:#}", cache_dir.display(), e);
    }

    let places_dir = expand_home(&config.storage.location);
    let saved = match FjallStore::open(&places_dir) {
        Ok(store) => SavedPlaces::new(Arc::new(store)),
        Err(e) => {
            warn!(
                "Saved places kept in memory only ({}): {}",
                places_dir.display(),
                e
            );
            SavedPlaces::in_memory()
        }
    };

    let client = http::build_client(&config.services).context("Failed to build HTTP client")?;
    let services = Services {
        geocoder: Arc::new(NominatimClient::new(client.clone(), &config.services)),
        router: Arc::new(OsrmClient::new(client.clone(), &config.services)),
        poi: Arc::new(OverpassClient::new(client, &config.services)),
    };

    // A plan fans out to routing and several POI lookups, each with retries
    let request_timeout =
        Duration::from_secs(u64::from(config.services.timeout_seconds) * 4);
    let web_config = config.web.clone();
    let state = AppState::new(services, Arc::new(config), saved);

    web::run(state, &web_config, request_timeout).await
}
