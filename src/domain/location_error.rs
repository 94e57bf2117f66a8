use thiserror::Error;

/// Everything that can keep an address from showing up. These are published, never fatal.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum LocationError {
    #[error("location services are turned off")]
    ServiceDisabled,
    #[error("location access is restricted, likely due to parental controls")]
    PermissionRestricted,
    #[error("location permission was denied, it can be changed in the settings")]
    PermissionDenied,
    #[error("malformed geocoding request: {0}")]
    MalformedRequestUrl(String),
    #[error("could not decode the geocoding response: {0}")]
    DecodeFailure(String),
    #[error("the geocoding response contained no results")]
    EmptyResultSet,
    #[error("the geocoding provider answered {status}: {}", message.as_deref().unwrap_or("no message"))]
    ProviderRejected { status: String, message: Option<String> },
    #[error("geocoding request failed: {0}")]
    Request(String),
}
