use crate::app_config::AppConfig;
use crate::domain::Coordinate;
use crate::geocoding::response::GeocodeResponse;
use crate::geocoding::{GeocodeError, ReverseGeocoder};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::sync::Arc;
use tracing::{debug, info, instrument, trace};

#[derive(Debug)]
pub struct GoogleGeocoder {
    client: Client,
    config: Arc<AppConfig>,
}

impl GoogleGeocoder {
    pub fn new(client: Client, config: Arc<AppConfig>) -> Self {
        GoogleGeocoder { client, config }
    }

    fn request_url(&self, latlng: &str) -> Result<Url, GeocodeError> {
        let latlng = latlng.parse::<Coordinate>()?.to_string();
        let geocoding = self.config.geocoding();

        Url::parse_with_params(
            geocoding.url(),
            &[
                ("latlng", latlng.as_str()),
                ("location_type", geocoding.location_type()),
                ("result_type", geocoding.result_type()),
                ("key", geocoding.api_key()),
            ],
        )
        .map_err(|e| GeocodeError::MalformedUrl(format!("{} for '{}'", e, geocoding.url())))
    }
}

#[async_trait]
impl ReverseGeocoder for GoogleGeocoder {
    #[instrument(skip(self))]
    async fn reverse_geocode(&self, latlng: &str) -> Result<String, GeocodeError> {
        let url = self.request_url(latlng)?;

        debug!("📍 Resolving address...");
        // The URL carries the API key, keep it out of errors
        let body = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(reqwest::Error::without_url)?
            .bytes()
            .await
            .map_err(reqwest::Error::without_url)?;
        trace!(body = %String::from_utf8_lossy(&body), "📍 Received geocoding response");

        let response: GeocodeResponse = serde_json::from_slice(&body)?;
        match response.first_formatted_address() {
            Some(address) => {
                info!(status = %response.status, "📍 Resolving address... OK, '{}'", address);
                Ok(address.to_string())
            }
            None if response.status.is_success() => Err(GeocodeError::EmptyResultSet),
            None => Err(GeocodeError::ProviderRejected {
                status: response.status.to_string(),
                message: response.error_message.clone(),
            }),
        }
    }
}
