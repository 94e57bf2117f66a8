use crate::domain::{AuthorizationState, Coordinate};
use std::fmt::Debug;

/// What the platform's location manager offers us. Answers to `request_permission` arrive later as an
/// authorization change, never as a return value.
pub trait LocationService: Debug + Send + Sync {
    fn services_enabled(&self) -> bool;

    fn request_permission(&self);

    fn authorization_state(&self) -> AuthorizationState;

    /// `None` while the platform has no fix yet.
    fn current_coordinate(&self) -> Option<Coordinate>;
}
