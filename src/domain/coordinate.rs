use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }

        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }

        Ok(Coordinate { latitude, longitude })
    }
}

/// Renders as `lat,lng` using the shortest representation that round-trips, never locale dependent.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((latitude, longitude)) = s.split_once(',') else {
            return Err(CoordinateError::MissingSeparator(s.to_string()));
        };

        let latitude = parse_degrees(latitude)?;
        let longitude = parse_degrees(longitude)?;
        Coordinate::new(latitude, longitude)
    }
}

fn parse_degrees(s: &str) -> Result<f64, CoordinateError> {
    let trimmed = s.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CoordinateError::InvalidNumber(trimmed.to_string())),
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum CoordinateError {
    #[error("expected 'lat,lng' but got '{0}'")]
    MissingSeparator(String),
    #[error("'{0}' is not a valid number of degrees")]
    InvalidNumber(String),
    #[error("invalid latitude: {0}, must be between -90 and 90")]
    LatitudeOutOfRange(f64),
    #[error("invalid longitude: {0}, must be between -180 and 180")]
    LongitudeOutOfRange(f64),
}
