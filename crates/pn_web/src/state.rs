use std::sync::Arc;
use pn_feeds::{FetchCoordinator, WhiteHouseSource};
use pn_realtime::{BroadcastConfig, SubscriptionRegistry};

pub struct AppState {
    pub coordinator: Arc<FetchCoordinator>,
    pub registry: Arc<SubscriptionRegistry>,
    pub whitehouse: WhiteHouseSource,
    /// Reported by the analytics summary
    pub broadcast: BroadcastConfig,
}

impl AppState {
    pub fn new(
        coordinator: Arc<FetchCoordinator>,
        registry: Arc<SubscriptionRegistry>,
        broadcast: BroadcastConfig,
    ) -> Self {
        Self {
            coordinator,
            registry,
            whitehouse: WhiteHouseSource::new(),
            broadcast,
        }
    }
}
