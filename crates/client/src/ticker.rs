//! Recomputes a time-dependent display from a polled snapshot.
//!
//! Live metrics (elapsed time, effective throughput) change every second
//! even when the underlying snapshot does not. A [`LiveDisplay`] re-derives
//! its value whenever the source changes, and once per [`LIVE_TICK`] while
//! the derive function reports the value as live.

use std::time::Duration;

use chrono::Utc;
use chunkycloud_core::types::Timestamp;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Refresh period of live values.
pub const LIVE_TICK: Duration = Duration::from_secs(1);

/// A derived value plus whether it keeps changing with the clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived<D> {
    pub value: D,
    pub live: bool,
}

/// Handle to a running derive task. Dropping it stops the task.
pub struct LiveDisplay<D> {
    rx: watch::Receiver<D>,
    cancel: CancellationToken,
}

impl<D> LiveDisplay<D>
where
    D: Send + Sync + 'static,
{
    /// Spawn the derive task.
    pub fn spawn<S, F>(mut source: watch::Receiver<S>, derive: F) -> Self
    where
        S: Send + Sync + 'static,
        F: Fn(&S, Timestamp) -> Derived<D> + Send + 'static,
    {
        let initial = derive(&source.borrow_and_update(), Utc::now());
        let mut live = initial.live;
        let (tx, rx) = watch::channel(initial.value);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            loop {
                let tick = async move {
                    if live {
                        tokio::time::sleep(LIVE_TICK).await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                };

                tokio::select! {
                    _ = token.cancelled() => break,
                    changed = source.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = tick => {}
                }

                let next = derive(&source.borrow_and_update(), Utc::now());
                live = next.live;
                tx.send_replace(next.value);
            }
        });

        Self { rx, cancel }
    }

    pub fn subscribe(&self) -> watch::Receiver<D> {
        self.rx.clone()
    }

    pub fn current(&self) -> watch::Ref<'_, D> {
        self.rx.borrow()
    }
}

impl<D> Drop for LiveDisplay<D> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
