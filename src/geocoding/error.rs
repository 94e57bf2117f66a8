use crate::domain::{CoordinateError, LocationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("malformed coordinates: {0}")]
    MalformedCoordinates(#[from] CoordinateError),
    #[error("malformed request URL: {0}")]
    MalformedUrl(String),
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no results")]
    EmptyResultSet,
    #[error("provider answered {status}")]
    ProviderRejected { status: String, message: Option<String> },
}

impl From<&GeocodeError> for LocationError {
    fn from(error: &GeocodeError) -> Self {
        match error {
            GeocodeError::MalformedCoordinates(e) => LocationError::MalformedRequestUrl(e.to_string()),
            GeocodeError::MalformedUrl(e) => LocationError::MalformedRequestUrl(e.clone()),
            GeocodeError::Request(e) => LocationError::Request(e.to_string()),
            GeocodeError::Decode(e) => LocationError::DecodeFailure(e.to_string()),
            GeocodeError::EmptyResultSet => LocationError::EmptyResultSet,
            GeocodeError::ProviderRejected { status, message } => LocationError::ProviderRejected {
                status: status.clone(),
                message: message.clone(),
            },
        }
    }
}
