use crate::geocoding::GeocodeError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Turns a `lat,lng` string into the provider's formatted address.
#[async_trait]
pub trait ReverseGeocoder: Debug + Send + Sync {
    async fn reverse_geocode(&self, latlng: &str) -> Result<String, GeocodeError>;
}
