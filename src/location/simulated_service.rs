use crate::app_config::Platform;
use crate::domain::{AuthorizationState, Coordinate};
use crate::location::LocationService;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Stands in for a device location manager, configured up front.
#[derive(Debug)]
pub struct SimulatedLocationService {
    services_enabled: bool,
    grant_on_request: bool,
    coordinate: Option<Coordinate>,
    authorization: watch::Sender<AuthorizationState>,
    changes: UnboundedSender<AuthorizationState>,
}

impl SimulatedLocationService {
    /// Also returns the stream of authorization changes, every change is delivered in order.
    pub fn new(
        services_enabled: bool,
        authorization: AuthorizationState,
        grant_on_request: bool,
        coordinate: Option<Coordinate>,
    ) -> (Self, UnboundedReceiver<AuthorizationState>) {
        let (authorization, _) = watch::channel(authorization);
        let (changes, changes_rx) = mpsc::unbounded_channel();

        let service = SimulatedLocationService {
            services_enabled,
            grant_on_request,
            coordinate,
            authorization,
            changes,
        };
        (service, changes_rx)
    }

    pub fn from_config(platform: &Platform) -> (Self, UnboundedReceiver<AuthorizationState>) {
        Self::new(
            platform.services_enabled(),
            platform.authorization(),
            platform.grant_on_request(),
            platform.coordinate(),
        )
    }

    /// Simulates the user flipping the permission in the system settings.
    pub fn change_authorization(&self, state: AuthorizationState) {
        info!("📱 Authorization changed to {}", state);
        self.authorization.send_replace(state);

        if self.changes.send(state).is_err() {
            warn!("⚠️ Nobody is listening for authorization changes, dropping {}", state);
        }
    }
}

impl LocationService for SimulatedLocationService {
    fn services_enabled(&self) -> bool {
        self.services_enabled
    }

    fn request_permission(&self) {
        let answer = if self.grant_on_request {
            AuthorizationState::AuthorizedWhenInUse
        } else {
            AuthorizationState::Denied
        };

        debug!("📱 Permission prompt answered with {}", answer);
        self.change_authorization(answer);
    }

    fn authorization_state(&self) -> AuthorizationState {
        *self.authorization.borrow()
    }

    fn current_coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }
}
