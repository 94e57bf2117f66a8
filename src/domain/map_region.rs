use crate::domain::Coordinate;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Span {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Default for Span {
    fn default() -> Self {
        Span {
            latitude_delta: 0.01,
            longitude_delta: 0.01,
        }
    }
}

/// The part of the map that is on display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapRegion {
    pub center: Coordinate,
    pub span: Span,
}

impl MapRegion {
    pub fn centered_on(center: Coordinate, span: Span) -> Self {
        MapRegion { center, span }
    }
}
