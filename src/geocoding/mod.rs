mod client;
mod error;
mod geocoder;
mod google_geocoder;
pub mod response;

pub use client::{GeocodingClientError, new_client};
pub use error::GeocodeError;
pub use geocoder::ReverseGeocoder;
pub use google_geocoder::GoogleGeocoder;
