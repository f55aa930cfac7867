//! Periodic refresh of a remotely held value.
//!
//! A [`Poller`] binds a displayed snapshot to a remote resource key. Setting
//! a new key tears the current refresh loop down and starts a fresh one;
//! the snapshot is published through a [`tokio::sync::watch`] channel that
//! only the poller writes to.
//!
//! Every loop owns a private staleness flag. Teardown sets it before doing
//! anything else, and a loop applies a fetched value only while its flag is
//! still clear, so a superseded loop can never overwrite a newer one. The
//! in-flight request of a torn-down loop is not aborted; its result is
//! dropped when it arrives.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::ApiError;
use crate::config::DEFAULT_POLL_INTERVAL_SECS;

/// Result of a single successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Found(T),
    /// The service said the resource does not exist.
    NotFound,
}

/// A remote resource the poller can refresh.
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    type Key: Clone + PartialEq + Debug + Send + Sync + 'static;
    type Value: Debug + Send + Sync + 'static;

    async fn fetch(&self, key: &Self::Key) -> Result<Fetched<Self::Value>, ApiError>;
}

/// What a view currently displays.
#[derive(Debug)]
pub enum Snapshot<T> {
    /// Nothing fetched yet for the current key.
    Loading,
    /// The resource does not exist.
    NotFound,
    Ready(Arc<T>),
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Loading => Self::Loading,
            Self::NotFound => Self::NotFound,
            Self::Ready(value) => Self::Ready(Arc::clone(value)),
        }
    }
}

impl<T> Snapshot<T> {
    pub fn ready(&self) -> Option<&Arc<T>> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl<T> From<Fetched<T>> for Snapshot<T> {
    fn from(fetched: Fetched<T>) -> Self {
        match fetched {
            Fetched::Found(value) => Self::Ready(Arc::new(value)),
            Fetched::NotFound => Self::NotFound,
        }
    }
}

/// Refresh cadence settings.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
    /// Fetch as soon as a loop starts instead of waiting one interval.
    pub immediate_first_fetch: bool,
}

/// Shortest refresh period a loop will run with.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            immediate_first_fetch: true,
        }
    }
}

/// Bookkeeping for the one running refresh loop.
struct ActiveLoop<K> {
    key: K,
    stale: Arc<AtomicBool>,
    /// Stops the loop's timer.
    cancel: CancellationToken,
}

/// Keeps a [`Snapshot`] fresh for the current key.
///
/// At most one refresh loop runs at a time. Dropping the poller tears the
/// loop down.
pub struct Poller<F: Fetch> {
    fetcher: Arc<F>,
    config: PollerConfig,
    tx: Arc<watch::Sender<Snapshot<F::Value>>>,
    active: Option<ActiveLoop<F::Key>>,
}

impl<F: Fetch> Poller<F> {
    /// A zero interval is raised to the minimum period.
    pub fn new(fetcher: F, mut config: PollerConfig) -> Self {
        config.interval = config.interval.max(MIN_INTERVAL);
        let (tx, _) = watch::channel(Snapshot::Loading);
        Self {
            fetcher: Arc::new(fetcher),
            config,
            tx: Arc::new(tx),
            active: None,
        }
    }

    /// Receive every snapshot the poller publishes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<F::Value>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Snapshot<F::Value> {
        self.tx.borrow().clone()
    }

    /// Key of the running loop, if any.
    pub fn key(&self) -> Option<&F::Key> {
        self.active.as_ref().map(|a| &a.key)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Point the poller at `key`.
    ///
    /// The same key as the running loop is a no-op. Any other value tears
    /// the running loop down (resetting the snapshot to
    /// [`Snapshot::Loading`]) and, for `Some`, starts a new loop.
    pub fn set_key(&mut self, key: Option<F::Key>) {
        if self.key() == key.as_ref() {
            return;
        }
        self.teardown();
        if let Some(key) = key {
            self.spawn_loop(key);
        }
    }

    /// Like [`set_key`](Self::set_key), but display `initial` until the
    /// first fetch of the new loop replaces it.
    pub fn set_key_with_initial(&mut self, key: F::Key, initial: F::Value) {
        self.teardown();
        self.tx.send_replace(Snapshot::Ready(Arc::new(initial)));
        self.spawn_loop(key);
    }

    /// Stop the running loop and reset the snapshot.
    ///
    /// Sets the loop's staleness flag, cancels its timer, then publishes
    /// [`Snapshot::Loading`]. All three happen before this returns.
    pub fn teardown(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        active.stale.store(true, Ordering::SeqCst);
        active.cancel.cancel();
        self.tx.send_replace(Snapshot::Loading);
        tracing::debug!(key = ?active.key, "Poller torn down");
    }

    fn spawn_loop(&mut self, key: F::Key) {
        let stale = Arc::new(AtomicBool::new(false));
        let cancel = CancellationToken::new();

        tokio::spawn(run_loop(
            Arc::clone(&self.fetcher),
            key.clone(),
            self.config.clone(),
            Arc::clone(&stale),
            cancel.clone(),
            Arc::clone(&self.tx),
        ));

        tracing::debug!(key = ?key, interval_secs = self.config.interval.as_secs(), "Poller started");
        self.active = Some(ActiveLoop { key, stale, cancel });
    }
}

impl<F: Fetch> Drop for Poller<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// One refresh loop: wait for the timer, fetch, apply unless stale.
///
/// Requests are issued one at a time. Cancellation only interrupts the wait;
/// a fetch that has started runs to completion.
async fn run_loop<F: Fetch>(
    fetcher: Arc<F>,
    key: F::Key,
    config: PollerConfig,
    stale: Arc<AtomicBool>,
    cancel: CancellationToken,
    tx: Arc<watch::Sender<Snapshot<F::Value>>>,
) {
    let start = if config.immediate_first_fetch {
        Instant::now()
    } else {
        Instant::now() + config.interval
    };
    let mut ticker = tokio::time::interval_at(start, config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match fetcher.fetch(&key).await {
            Ok(fetched) => {
                if !publish(&tx, &stale, fetched.into()) {
                    tracing::debug!(key = ?key, "Discarding result of superseded poll");
                    break;
                }
            }
            Err(e) => {
                // Keep the previous snapshot; the next tick retries.
                tracing::warn!(key = ?key, error = %e, "Poll failed");
            }
        }
    }
}

/// Replace the published snapshot unless the loop has gone stale.
///
/// The flag is read inside the channel's write lock. Teardown sets the flag
/// before it takes that lock to publish `Loading`, so either this write is
/// refused or it lands before the reset.
fn publish<T>(tx: &watch::Sender<Snapshot<T>>, stale: &AtomicBool, next: Snapshot<T>) -> bool {
    let mut applied = false;
    tx.send_if_modified(|current| {
        if stale.load(Ordering::SeqCst) {
            return false;
        }
        *current = next;
        applied = true;
        true
    });
    applied
}
