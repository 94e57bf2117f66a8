use crate::app_config::AppConfig;
use reqwest::Client;
use thiserror::Error;

pub fn new_client(config: &AppConfig) -> Result<Client, GeocodingClientError> {
    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(config.geocoding().timeout())
        .build()?;
    Ok(client)
}

#[derive(Error, Debug)]
pub enum GeocodingClientError {
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
}
