use crate::domain::{AuthorizationState, LocationError, MapRegion};

#[derive(Debug)]
pub enum Event {
    AuthorizationChanged(AuthorizationState),
    RegionChanged(MapRegion),
    LocationUnavailable(LocationError),
    GeocodeRequested { sequence: u64 },
    AddressResolved { sequence: u64, address: String },
    GeocodeFailed { sequence: u64, error: LocationError },
}
