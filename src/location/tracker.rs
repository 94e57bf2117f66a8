use crate::app_config::Map;
use crate::domain::events::Event;
use crate::domain::{AuthorizationState, Coordinate, LocationError, MapRegion, Span};
use crate::geocoding::ReverseGeocoder;
use crate::location::LocationService;
use std::sync::Arc;
use tokio::sync::mpsc::{Sender, UnboundedReceiver};
use tokio::task;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, PartialEq)]
pub enum Initialization {
    ServicesDisabled,
    Started(AuthorizationOutcome),
}

/// Which handler an authorization change was routed to.
#[derive(Debug, PartialEq)]
pub enum AuthorizationOutcome {
    PermissionRequested,
    Restricted,
    Denied,
    Resolving { coordinate: Coordinate, sequence: u64 },
    Ignored,
}

/// Follows the platform's authorization state and resolves the address of the device whenever access is granted.
#[derive(Debug)]
pub struct LocationTracker {
    service: Arc<dyn LocationService>,
    geocoder: Arc<dyn ReverseGeocoder>,
    tx: Sender<Event>,
    default_span: Span,
    previous_coordinates: Coordinate,
    sequence: u64,
}

impl LocationTracker {
    pub fn new(service: Arc<dyn LocationService>, geocoder: Arc<dyn ReverseGeocoder>, tx: Sender<Event>, map: &Map) -> Self {
        LocationTracker {
            service,
            geocoder,
            tx,
            default_span: map.default_span(),
            previous_coordinates: map.starting_location(),
            sequence: 0,
        }
    }

    pub fn previous_coordinates(&self) -> Coordinate {
        self.previous_coordinates
    }

    #[instrument(skip_all)]
    pub async fn initialize(&mut self) -> Initialization {
        if !self.service.services_enabled() {
            warn!("⚠️ Location services are disabled, turn them on to see your address");
            self.publish(Event::LocationUnavailable(LocationError::ServiceDisabled)).await;
            return Initialization::ServicesDisabled;
        }

        let state = self.service.authorization_state();
        Initialization::Started(self.on_authorization_changed(state).await)
    }

    /// Handles every authorization change the platform reports, including the initial one.
    #[instrument(skip(self))]
    pub async fn on_authorization_changed(&mut self, state: AuthorizationState) -> AuthorizationOutcome {
        self.publish(Event::AuthorizationChanged(state)).await;

        match state {
            AuthorizationState::NotDetermined => {
                info!("🔐 Requesting location permission...");
                self.service.request_permission();
                AuthorizationOutcome::PermissionRequested
            }
            AuthorizationState::Restricted => {
                warn!("⚠️ Location is restricted, likely due to parental controls");
                self.publish(Event::LocationUnavailable(LocationError::PermissionRestricted)).await;
                AuthorizationOutcome::Restricted
            }
            AuthorizationState::Denied => {
                warn!("⚠️ Location permission was denied, it can be changed in the settings");
                self.publish(Event::LocationUnavailable(LocationError::PermissionDenied)).await;
                AuthorizationOutcome::Denied
            }
            AuthorizationState::AuthorizedAlways | AuthorizationState::AuthorizedWhenInUse => self.resolve_current_location().await,
            AuthorizationState::Unknown => {
                debug!("Ignoring unknown authorization state");
                AuthorizationOutcome::Ignored
            }
        }
    }

    /// Feeds platform authorization changes into the tracker until the platform goes away.
    #[instrument(skip_all)]
    pub async fn listen(&mut self, mut rx: UnboundedReceiver<AuthorizationState>) {
        while let Some(state) = rx.recv().await {
            self.on_authorization_changed(state).await;
        }
    }

    async fn resolve_current_location(&mut self) -> AuthorizationOutcome {
        let coordinate = self.service.current_coordinate().unwrap_or_else(|| {
            debug!("No location fix yet, using the previous coordinates");
            self.previous_coordinates
        });

        self.publish(Event::RegionChanged(MapRegion::centered_on(coordinate, self.default_span))).await;

        let latlng = format_coordinates(coordinate);
        self.previous_coordinates = coordinate;

        self.sequence += 1;
        let sequence = self.sequence;
        self.publish(Event::GeocodeRequested { sequence }).await;

        let geocoder = self.geocoder.clone();
        let tx = self.tx.clone();
        task::spawn(async move {
            let event = match geocoder.reverse_geocode(&latlng).await {
                Ok(address) => Event::AddressResolved { sequence, address },
                Err(e) => {
                    warn!(sequence, "⚠️ Could not resolve the address of {}: {}", latlng, e);
                    Event::GeocodeFailed {
                        sequence,
                        error: LocationError::from(&e),
                    }
                }
            };

            if let Err(e) = tx.send(event).await {
                warn!(sequence, "⚠️ Store is gone, dropping geocoding result: {:?}", e.0);
            }
        });

        info!(sequence, "📍 Resolving address for {}...", coordinate);
        AuthorizationOutcome::Resolving { coordinate, sequence }
    }

    async fn publish(&self, event: Event) {
        if let Err(e) = self.tx.send(event).await {
            warn!("⚠️ Store is gone, dropping event: {:?}", e.0);
        }
    }
}

pub fn format_coordinates(coordinate: Coordinate) -> String {
    coordinate.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfigBuilder;
    use crate::domain::AddressStatus;
    use crate::geocoding::GeocodeError;
    use crate::location::SimulatedLocationService;
    use crate::store::{PENDING_ADDRESS, Store};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use test_log::test;
    use tokio::sync::mpsc::{self, Receiver};
    use tokio::sync::oneshot;

    const STARTING_LOCATION: Coordinate = Coordinate {
        latitude: 37.331516,
        longitude: -121.891054,
    };

    #[derive(Debug)]
    struct FakeLocationService {
        enabled: bool,
        state: AuthorizationState,
        coordinate: Option<Coordinate>,
        permission_requests: AtomicUsize,
    }

    impl FakeLocationService {
        fn new(state: AuthorizationState, coordinate: Option<Coordinate>) -> Self {
            FakeLocationService {
                enabled: true,
                state,
                coordinate,
                permission_requests: AtomicUsize::new(0),
            }
        }

        fn disabled() -> Self {
            FakeLocationService {
                enabled: false,
                ..Self::new(AuthorizationState::AuthorizedAlways, None)
            }
        }
    }

    impl LocationService for FakeLocationService {
        fn services_enabled(&self) -> bool {
            self.enabled
        }

        fn request_permission(&self) {
            self.permission_requests.fetch_add(1, Ordering::SeqCst);
        }

        fn authorization_state(&self) -> AuthorizationState {
            self.state
        }

        fn current_coordinate(&self) -> Option<Coordinate> {
            self.coordinate
        }
    }

    #[derive(Debug, Default)]
    struct FakeGeocoder {
        requests: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ReverseGeocoder for FakeGeocoder {
        async fn reverse_geocode(&self, latlng: &str) -> Result<String, GeocodeError> {
            self.requests.lock().unwrap().push(latlng.to_string());
            Ok(format!("Address of {}", latlng))
        }
    }

    /// Answers a request for a coordinate only once the test opens its gate.
    #[derive(Debug, Default)]
    struct GatedGeocoder {
        gates: Mutex<HashMap<String, oneshot::Receiver<Result<String, GeocodeError>>>>,
    }

    impl GatedGeocoder {
        fn gate(&self, latlng: &str) -> oneshot::Sender<Result<String, GeocodeError>> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(latlng.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl ReverseGeocoder for GatedGeocoder {
        async fn reverse_geocode(&self, latlng: &str) -> Result<String, GeocodeError> {
            let gate = self.gates.lock().unwrap().remove(latlng).expect("Expected a gate for every request");
            gate.await.unwrap_or(Err(GeocodeError::EmptyResultSet))
        }
    }

    fn tracker(service: Arc<dyn LocationService>, geocoder: Arc<dyn ReverseGeocoder>) -> (LocationTracker, Receiver<Event>) {
        let (tx, rx) = mpsc::channel::<Event>(32);
        let config = AppConfigBuilder::new().build();
        (LocationTracker::new(service, geocoder, tx, config.map()), rx)
    }

    fn drain(rx: &mut Receiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[rstest]
    #[case(AuthorizationState::NotDetermined, AuthorizationOutcome::PermissionRequested, 1)]
    #[case(AuthorizationState::Restricted, AuthorizationOutcome::Restricted, 0)]
    #[case(AuthorizationState::Denied, AuthorizationOutcome::Denied, 0)]
    #[case(AuthorizationState::Unknown, AuthorizationOutcome::Ignored, 0)]
    #[tokio::test]
    async fn routes_each_state_to_its_own_handler(
        #[case] state: AuthorizationState,
        #[case] expected: AuthorizationOutcome,
        #[case] expected_permission_requests: usize,
    ) {
        let service = Arc::new(FakeLocationService::new(state, None));
        let geocoder = Arc::new(FakeGeocoder::default());
        let (mut tracker, _rx) = tracker(service.clone(), geocoder.clone());

        let outcome = tracker.on_authorization_changed(state).await;

        assert_eq!(outcome, expected);
        assert_eq!(service.permission_requests.load(Ordering::SeqCst), expected_permission_requests);
        assert!(geocoder.requests.lock().unwrap().is_empty());
        assert_eq!(tracker.previous_coordinates(), STARTING_LOCATION);
    }

    #[rstest]
    #[case(AuthorizationState::AuthorizedAlways)]
    #[case(AuthorizationState::AuthorizedWhenInUse)]
    #[tokio::test]
    async fn resolves_the_live_coordinate_when_authorized(#[case] state: AuthorizationState) {
        let live = Coordinate {
            latitude: 37.349046,
            longitude: -121.938281,
        };
        let service = Arc::new(FakeLocationService::new(state, Some(live)));
        let (mut tracker, mut rx) = tracker(service.clone(), Arc::new(FakeGeocoder::default()));

        let outcome = tracker.on_authorization_changed(state).await;

        assert_eq!(outcome, AuthorizationOutcome::Resolving { coordinate: live, sequence: 1 });
        assert_eq!(tracker.previous_coordinates(), live);
        assert_eq!(service.permission_requests.load(Ordering::SeqCst), 0);

        let events = drain(&mut rx);
        assert!(matches!(events[0], Event::AuthorizationChanged(s) if s == state));
        assert!(matches!(events[1], Event::RegionChanged(region) if region == MapRegion::centered_on(live, Span::default())));
        assert!(matches!(events[2], Event::GeocodeRequested { sequence: 1 }));

        match rx.recv().await {
            Some(Event::AddressResolved { sequence, address }) => {
                assert_eq!(sequence, 1);
                assert_eq!(address, "Address of 37.349046,-121.938281");
            }
            other => panic!("Expected a resolved address, got {:?}", other),
        }
    }

    #[test(tokio::test)]
    async fn falls_back_to_the_previous_coordinates_without_a_fix() {
        let service = Arc::new(FakeLocationService::new(AuthorizationState::AuthorizedWhenInUse, None));
        let geocoder = Arc::new(FakeGeocoder::default());
        let (mut tracker, mut rx) = tracker(service, geocoder.clone());

        let first = tracker.on_authorization_changed(AuthorizationState::AuthorizedWhenInUse).await;
        let second = tracker.on_authorization_changed(AuthorizationState::AuthorizedWhenInUse).await;

        assert_eq!(
            first,
            AuthorizationOutcome::Resolving {
                coordinate: STARTING_LOCATION,
                sequence: 1
            }
        );
        assert_eq!(
            second,
            AuthorizationOutcome::Resolving {
                coordinate: STARTING_LOCATION,
                sequence: 2
            }
        );
        assert_eq!(tracker.previous_coordinates(), STARTING_LOCATION);

        // Both requests report back before the geocoder's log is inspected
        let mut resolved = 0;
        while resolved < 2 {
            if let Some(Event::AddressResolved { .. }) = rx.recv().await {
                resolved += 1;
            }
        }
        assert_eq!(
            *geocoder.requests.lock().unwrap(),
            vec!["37.331516,-121.891054".to_string(), "37.331516,-121.891054".to_string()]
        );
    }

    #[test(tokio::test)]
    async fn remembers_the_last_fix_for_later_fallbacks() {
        let live = Coordinate {
            latitude: 51.8615899,
            longitude: 4.3580323,
        };
        let (mut tracker, _rx) = tracker(
            Arc::new(FakeLocationService::new(AuthorizationState::AuthorizedAlways, Some(live))),
            Arc::new(FakeGeocoder::default()),
        );
        tracker.on_authorization_changed(AuthorizationState::AuthorizedAlways).await;

        tracker.service = Arc::new(FakeLocationService::new(AuthorizationState::AuthorizedAlways, None));
        let outcome = tracker.on_authorization_changed(AuthorizationState::AuthorizedAlways).await;

        assert_eq!(outcome, AuthorizationOutcome::Resolving { coordinate: live, sequence: 2 });
        assert_eq!(tracker.previous_coordinates(), live);
    }

    #[test(tokio::test)]
    async fn reports_disabled_location_services() {
        let (mut tracker, mut rx) = tracker(Arc::new(FakeLocationService::disabled()), Arc::new(FakeGeocoder::default()));

        let initialization = tracker.initialize().await;

        assert_eq!(initialization, Initialization::ServicesDisabled);
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Event::LocationUnavailable(LocationError::ServiceDisabled)));
    }

    #[test(tokio::test)]
    async fn initialization_handles_the_current_authorization_state() {
        let service = Arc::new(FakeLocationService::new(AuthorizationState::NotDetermined, None));
        let (mut tracker, _rx) = tracker(service.clone(), Arc::new(FakeGeocoder::default()));

        let initialization = tracker.initialize().await;

        assert_eq!(initialization, Initialization::Started(AuthorizationOutcome::PermissionRequested));
        assert_eq!(service.permission_requests.load(Ordering::SeqCst), 1);
    }

    #[test(tokio::test)]
    async fn publishes_why_location_is_unavailable() {
        let (mut tracker, mut rx) = tracker(
            Arc::new(FakeLocationService::new(AuthorizationState::Denied, None)),
            Arc::new(FakeGeocoder::default()),
        );

        tracker.on_authorization_changed(AuthorizationState::Restricted).await;
        tracker.on_authorization_changed(AuthorizationState::Denied).await;

        let notices = drain(&mut rx)
            .into_iter()
            .filter_map(|event| match event {
                Event::LocationUnavailable(error) => Some(error),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(notices, vec![LocationError::PermissionRestricted, LocationError::PermissionDenied]);
    }

    #[test(tokio::test)]
    async fn a_stale_answer_does_not_overwrite_the_latest_address() {
        let geocoder = Arc::new(GatedGeocoder::default());
        let first_gate = geocoder.gate("37.331516,-121.891054");
        let second_gate = geocoder.gate("37.349046,-121.938281");
        let (mut tracker, mut rx) = tracker(
            Arc::new(FakeLocationService::new(AuthorizationState::AuthorizedWhenInUse, Some(STARTING_LOCATION))),
            geocoder.clone(),
        );
        let config = AppConfigBuilder::new().build();
        let (_store_tx, store_rx) = mpsc::channel::<Event>(1);
        let mut store = Store::new(store_rx, MapRegion::centered_on(config.map().starting_location(), config.map().default_span()));

        tracker.on_authorization_changed(AuthorizationState::AuthorizedWhenInUse).await;
        tracker.service = Arc::new(FakeLocationService::new(
            AuthorizationState::AuthorizedWhenInUse,
            Some(Coordinate {
                latitude: 37.349046,
                longitude: -121.938281,
            }),
        ));
        tracker.on_authorization_changed(AuthorizationState::AuthorizedWhenInUse).await;
        for event in drain(&mut rx) {
            store.apply(event);
        }
        assert_eq!(store.snapshot().address, PENDING_ADDRESS);

        // The second request is answered before the first one
        second_gate.send(Ok("Second".to_string())).unwrap();
        let second = rx.recv().await.unwrap();
        first_gate.send(Ok("First".to_string())).unwrap();
        let first = rx.recv().await.unwrap();

        assert!(store.apply(second));
        assert!(!store.apply(first));
        assert_eq!(store.snapshot().address, "Second");
        assert!(matches!(store.snapshot().status, AddressStatus::Resolved { .. }));
    }

    #[test(tokio::test)]
    async fn listens_for_authorization_changes() {
        let (service, authorization_rx) = SimulatedLocationService::new(true, AuthorizationState::NotDetermined, true, None);
        let service = Arc::new(service);
        let (mut tracker, mut rx) = tracker(service.clone(), Arc::new(FakeGeocoder::default()));

        tracker.initialize().await;
        let listener = task::spawn(async move {
            tracker.listen(authorization_rx).await;
        });

        // The permission prompt is answered asynchronously, the address follows
        loop {
            match rx.recv().await {
                Some(Event::AddressResolved { sequence, address }) => {
                    assert_eq!(sequence, 1);
                    assert_eq!(address, "Address of 37.331516,-121.891054");
                    break;
                }
                Some(_) => continue,
                None => panic!("Expected a resolved address"),
            }
        }

        assert_eq!(service.authorization_state(), AuthorizationState::AuthorizedWhenInUse);
        listener.abort();
    }

    #[test(tokio::test)]
    async fn handles_back_to_back_authorization_changes() {
        let (service, authorization_rx) = SimulatedLocationService::new(true, AuthorizationState::NotDetermined, true, None);
        let service = Arc::new(service);
        let (mut tracker, mut rx) = tracker(service.clone(), Arc::new(FakeGeocoder::default()));

        service.change_authorization(AuthorizationState::Denied);
        service.change_authorization(AuthorizationState::AuthorizedAlways);
        let listener = task::spawn(async move {
            tracker.listen(authorization_rx).await;
        });

        let mut handled = Vec::new();
        let mut notices = Vec::new();
        loop {
            match rx.recv().await {
                Some(Event::AuthorizationChanged(state)) => handled.push(state),
                Some(Event::LocationUnavailable(error)) => notices.push(error),
                Some(Event::AddressResolved { .. }) => break,
                Some(_) => continue,
                None => panic!("Expected a resolved address"),
            }
        }

        assert_eq!(handled, vec![AuthorizationState::Denied, AuthorizationState::AuthorizedAlways]);
        assert_eq!(notices, vec![LocationError::PermissionDenied]);
        listener.abort();
    }
}
