use crate::domain::events::Event;
use crate::domain::{AddressStatus, AuthorizationState, LocationError, MapRegion};
use chrono::Utc;
use tokio::sync::mpsc::Receiver;
use tokio::sync::watch;
use tokio::sync::watch::{Receiver as WatchReceiver, Sender as WatchSender};
use tracing::{debug, info, instrument};

pub const PENDING_ADDRESS: &str = "Pending Address";

/// Everything a display needs, published as a whole after every change.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewSnapshot {
    /// `None` until the platform reported a first state.
    pub authorization: Option<AuthorizationState>,
    pub region: MapRegion,
    pub address: String,
    pub status: AddressStatus,
    pub notice: Option<LocationError>,
    latest_sequence: u64,
}

impl ViewSnapshot {
    fn new(region: MapRegion) -> Self {
        ViewSnapshot {
            authorization: None,
            region,
            address: PENDING_ADDRESS.to_string(),
            status: AddressStatus::Pending,
            notice: None,
            latest_sequence: 0,
        }
    }
}

/// Sole writer of the view state. Geocoding answers for anything but the latest request are dropped.
#[derive(Debug)]
pub struct Store {
    snapshot: ViewSnapshot,
    rx: Receiver<Event>,
    notifier_tx: WatchSender<ViewSnapshot>,
    notifier_rx: WatchReceiver<ViewSnapshot>,
}

impl Store {
    pub fn new(rx: Receiver<Event>, starting_region: MapRegion) -> Self {
        let snapshot = ViewSnapshot::new(starting_region);
        let (notifier_tx, notifier_rx) = watch::channel::<ViewSnapshot>(snapshot.clone());

        Store {
            snapshot,
            rx,
            notifier_tx,
            notifier_rx,
        }
    }

    pub fn notifier(&self) -> WatchReceiver<ViewSnapshot> {
        self.notifier_rx.clone()
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> &ViewSnapshot {
        &self.snapshot
    }

    #[instrument(skip(self))]
    pub async fn listen(&mut self) {
        while let Some(event) = self.rx.recv().await {
            debug!("🔵 Received event: {:?}", event);
            if self.apply(event) {
                self.notifier_tx.send(self.snapshot.clone()).unwrap_or_default();
            }
        }
    }

    /// Returns whether the snapshot changed.
    pub(crate) fn apply(&mut self, event: Event) -> bool {
        match event {
            Event::AuthorizationChanged(state) => {
                self.snapshot.authorization = Some(state);
                if state.is_authorized() {
                    self.snapshot.notice = None;
                }
            }
            Event::RegionChanged(region) => {
                self.snapshot.region = region;
            }
            Event::LocationUnavailable(error) => {
                self.snapshot.notice = Some(error);
            }
            Event::GeocodeRequested { sequence } => {
                if sequence <= self.snapshot.latest_sequence {
                    debug!(sequence, "🔵 Ignoring out of order geocoding request");
                    return false;
                }
                self.snapshot.latest_sequence = sequence;
                self.snapshot.status = AddressStatus::Resolving { sequence };
            }
            Event::AddressResolved { sequence, address } => {
                if self.is_stale(sequence) {
                    return false;
                }

                info!(sequence, "🟢 Updated address to '{}', was '{}'", address, self.snapshot.address);
                self.snapshot.address = address;
                self.snapshot.status = AddressStatus::Resolved { resolved_at: Utc::now() };
            }
            Event::GeocodeFailed { sequence, error } => {
                if self.is_stale(sequence) {
                    return false;
                }

                self.snapshot.status = AddressStatus::Failed(error);
            }
        }

        true
    }

    fn is_stale(&self, sequence: u64) -> bool {
        let stale = sequence < self.snapshot.latest_sequence;
        if stale {
            debug!(sequence, latest = self.snapshot.latest_sequence, "🔵 Dropping stale geocoding answer");
        }
        stale
    }
}
