use crate::app_config::AppConfig;
use crate::domain::MapRegion;
use crate::domain::events::Event;
use crate::geocoding::GoogleGeocoder;
use crate::location::{Initialization, LocationTracker, SimulatedLocationService};
use crate::store::Store;
use crate::store_listener::store_listener;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::{signal, task};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app_config;
mod coordinate_deserializer;
mod domain;
mod geocoding;
mod location;
mod store;
mod store_listener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = Arc::new(AppConfig::load()?);
    info!("✅  Loaded configuration");

    let client = geocoding::new_client(&config)?;
    let geocoder = Arc::new(GoogleGeocoder::new(client, config.clone()));

    let starting_region = MapRegion::centered_on(config.map().starting_location(), config.map().default_span());
    let (tx, rx) = mpsc::channel::<Event>(config.core().store_buffer_size());
    let mut store = Store::new(rx, starting_region);
    let notifier_rx = store.notifier();

    task::spawn(async move {
        store_listener(notifier_rx).await;
    });
    info!("✅  Initialized store listener");

    task::spawn(async move {
        store.listen().await;
    });
    info!("✅  Initialized store");

    let (location_service, authorization_rx) = SimulatedLocationService::from_config(config.platform());
    let location_service = Arc::new(location_service);
    let mut tracker = LocationTracker::new(location_service, geocoder, tx, config.map());

    match tracker.initialize().await {
        Initialization::ServicesDisabled => {
            warn!("🔴 Location services are off, nothing to track");
            signal::ctrl_c().await?;
        }
        Initialization::Started(outcome) => {
            info!("🔥 {} is up and running, {:?}", env!("CARGO_PKG_NAME"), outcome);
            tokio::select! {
                _ = tracker.listen(authorization_rx) => {}
                result = signal::ctrl_c() => result?,
            }
        }
    }

    info!("👋 Shutting down, last known location was {}", tracker.previous_coordinates());
    Ok(())
}
