use crate::domain::{AuthorizationState, Coordinate, Span};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_GEOCODING_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    core: Core,
    geocoding: Geocoding,
    map: Map,
    platform: Platform,
}

impl AppConfig {
    /// Reads `config.toml`, then `config_local.toml` and finally `CURBSIDE__*` environment variables,
    /// e.g. `CURBSIDE__GEOCODING__API_KEY`.
    pub fn load() -> Result<Self, AppConfigError> {
        let builder = Config::builder()
            .add_source(config::File::with_name("config").required(true))
            .add_source(config::File::with_name("config_local").required(false))
            .add_source(config::Environment::with_prefix("CURBSIDE").prefix_separator("__").separator("__"));

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppConfigError> {
        let config: AppConfig = builder.build()?.try_deserialize()?;

        if config.geocoding.api_key.trim().is_empty() {
            return Err(AppConfigError::MissingApiKey);
        }

        Ok(config)
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn geocoding(&self) -> &Geocoding {
        &self.geocoding
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }
}

#[derive(Error, Debug)]
pub enum AppConfigError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("no geocoding API key configured, set CURBSIDE__GEOCODING__API_KEY")]
    MissingApiKey,
}

#[derive(Debug, Deserialize)]
pub struct Core {
    store_buffer_size: usize,
}

impl Core {
    pub fn store_buffer_size(&self) -> usize {
        self.store_buffer_size
    }
}

#[derive(Debug, Deserialize)]
pub struct Geocoding {
    #[serde(default = "default_geocoding_url")]
    url: String,
    api_key: String,
    #[serde(default = "default_location_type")]
    location_type: String,
    #[serde(default = "default_result_type")]
    result_type: String,
    #[serde(with = "humantime_serde", default = "default_timeout")]
    timeout: Duration,
}

impl Geocoding {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn location_type(&self) -> &str {
        &self.location_type
    }

    pub fn result_type(&self) -> &str {
        &self.result_type
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn default_geocoding_url() -> String {
    DEFAULT_GEOCODING_URL.to_string()
}

fn default_location_type() -> String {
    "ROOFTOP".to_string()
}

fn default_result_type() -> String {
    "street_address".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

#[derive(Debug, Deserialize)]
pub struct Map {
    starting_location: Coordinate,
    #[serde(default)]
    default_span: Span,
}

impl Map {
    pub fn starting_location(&self) -> Coordinate {
        self.starting_location
    }

    pub fn default_span(&self) -> Span {
        self.default_span
    }
}

/// Drives the simulated location service the binary runs with.
#[derive(Debug, Deserialize)]
pub struct Platform {
    services_enabled: bool,
    authorization: AuthorizationState,
    grant_on_request: bool,
    coordinate: Option<Coordinate>,
}

impl Platform {
    pub fn services_enabled(&self) -> bool {
        self.services_enabled
    }

    pub fn authorization(&self) -> AuthorizationState {
        self.authorization
    }

    pub fn grant_on_request(&self) -> bool {
        self.grant_on_request
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                core: Core { store_buffer_size: 8 },
                geocoding: Geocoding {
                    url: DEFAULT_GEOCODING_URL.to_string(),
                    api_key: "key".to_string(),
                    location_type: default_location_type(),
                    result_type: default_result_type(),
                    timeout: Duration::from_secs(2),
                },
                map: Map {
                    starting_location: Coordinate {
                        latitude: 37.331516,
                        longitude: -121.891054,
                    },
                    default_span: Span::default(),
                },
                platform: Platform {
                    services_enabled: true,
                    authorization: AuthorizationState::AuthorizedWhenInUse,
                    grant_on_request: true,
                    coordinate: None,
                },
            },
        }
    }

    pub fn geocoding_url(mut self, url: String) -> Self {
        self.config.geocoding.url = url;
        self
    }

    pub fn api_key(mut self, api_key: &str) -> Self {
        self.config.geocoding.api_key = api_key.to_string();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
