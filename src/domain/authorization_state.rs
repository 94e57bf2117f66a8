use serde::Deserialize;
use std::fmt;

/// Location permission as reported by the platform. Observed, never changed by us.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationState {
    NotDetermined,
    Restricted,
    Denied,
    AuthorizedAlways,
    AuthorizedWhenInUse,
    #[serde(other)]
    Unknown,
}

impl AuthorizationState {
    pub fn is_authorized(&self) -> bool {
        matches!(self, AuthorizationState::AuthorizedAlways | AuthorizationState::AuthorizedWhenInUse)
    }
}

impl fmt::Display for AuthorizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AuthorizationState::NotDetermined => "not determined",
            AuthorizationState::Restricted => "restricted",
            AuthorizationState::Denied => "denied",
            AuthorizationState::AuthorizedAlways => "authorized always",
            AuthorizationState::AuthorizedWhenInUse => "authorized when in use",
            AuthorizationState::Unknown => "unknown",
        };
        f.write_str(text)
    }
}
