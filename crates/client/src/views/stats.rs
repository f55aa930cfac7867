//! Fleet statistics view.

use std::sync::Arc;

use chunkycloud_core::stats::AggregateStats;
use tokio::sync::watch;

use crate::api::RenderApi;
use crate::poller::{Poller, PollerConfig, Snapshot};
use crate::resources::StatsFetcher;

/// Polls `GET /stats` for as long as it lives.
pub struct StatsView {
    poller: Poller<StatsFetcher>,
}

impl StatsView {
    /// Start polling right away.
    pub fn new(api: Arc<RenderApi>, config: PollerConfig) -> Self {
        let mut poller = Poller::new(StatsFetcher::new(api), config);
        poller.set_key(Some(()));
        Self { poller }
    }

    /// Start polling with `initial` on display until the first fetch
    /// lands.
    pub fn seeded(api: Arc<RenderApi>, config: PollerConfig, initial: AggregateStats) -> Self {
        let mut poller = Poller::new(StatsFetcher::new(api), config);
        poller.set_key_with_initial((), initial);
        Self { poller }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<AggregateStats>> {
        self.poller.subscribe()
    }

    pub fn current(&self) -> Snapshot<AggregateStats> {
        self.poller.current()
    }
}
