use serde::{Deserialize, Serialize};
use std::fmt;

// API: https://developers.google.com/maps/documentation/geocoding/requests-reverse-geocoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plus_code: Option<PlusCode>,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    pub status: GeocodeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl GeocodeResponse {
    pub fn first_formatted_address(&self) -> Option<&str> {
        self.results.first().map(|result| result.formatted_address.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    pub formatted_address: String,
    pub geometry: Geometry,
    pub place_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plus_code: Option<PlusCode>,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
    pub location_type: String,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub northeast: LatLng,
    pub southwest: LatLng,
}

/// Open Location Code for the area, informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlusCode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compound_code: Option<String>,
    pub global_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeocodeStatus {
    Ok,
    ZeroResults,
    OverDailyLimit,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    UnknownError,
    /// Any status added to the API later on.
    #[serde(other)]
    Unrecognized,
}

impl GeocodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeocodeStatus::Ok => "OK",
            GeocodeStatus::ZeroResults => "ZERO_RESULTS",
            GeocodeStatus::OverDailyLimit => "OVER_DAILY_LIMIT",
            GeocodeStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            GeocodeStatus::RequestDenied => "REQUEST_DENIED",
            GeocodeStatus::InvalidRequest => "INVALID_REQUEST",
            GeocodeStatus::UnknownError => "UNKNOWN_ERROR",
            GeocodeStatus::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// Whether an empty result list is a legitimate answer rather than a refusal.
    pub fn is_success(&self) -> bool {
        matches!(self, GeocodeStatus::Ok | GeocodeStatus::ZeroResults)
    }
}

impl fmt::Display for GeocodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
