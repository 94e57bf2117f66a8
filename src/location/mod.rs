mod service;
mod simulated_service;
mod tracker;

pub use service::LocationService;
pub use simulated_service::SimulatedLocationService;
pub use tracker::{AuthorizationOutcome, Initialization, LocationTracker, format_coordinates};
