use crate::domain::AddressStatus;
use crate::store::ViewSnapshot;
use tokio::sync::watch::Receiver;
use tracing::{info, instrument, warn};

/// Stand-in for the map screen, renders every snapshot to the log.
#[instrument(skip_all)]
pub async fn store_listener(mut rx: Receiver<ViewSnapshot>) {
    while rx.changed().await.is_ok() {
        let snapshot: ViewSnapshot = rx.borrow_and_update().clone();
        render(&snapshot);
    }
}

fn render(snapshot: &ViewSnapshot) {
    let center = snapshot.region.center;

    if let Some(notice) = &snapshot.notice {
        warn!("🗺️  {}", notice);
    }

    match &snapshot.status {
        AddressStatus::Pending => info!(%center, "🗺️  {}", snapshot.address),
        AddressStatus::Resolving { sequence } => info!(%center, sequence, "🗺️  {} (resolving...)", snapshot.address),
        AddressStatus::Resolved { resolved_at } => info!(%center, %resolved_at, "🏠 {}", snapshot.address),
        AddressStatus::Failed(error) => warn!(%center, "🗺️  {} (could not resolve: {})", snapshot.address, error),
    }
}
