mod address_status;
mod authorization_state;
mod coordinate;
pub mod events;
mod location_error;
mod map_region;

pub use address_status::AddressStatus;
pub use authorization_state::AuthorizationState;
pub use coordinate::{Coordinate, CoordinateError};
pub use location_error::LocationError;
pub use map_region::{MapRegion, Span};
