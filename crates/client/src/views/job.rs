//! Job detail view: a polled [`JobState`] plus live metrics.

use std::sync::Arc;

use chunkycloud_core::job::JobState;
use chunkycloud_core::metrics::JobMetrics;
use chunkycloud_core::types::{JobId, Timestamp};
use tokio::sync::watch;

use crate::api::RenderApi;
use crate::poller::{Poller, PollerConfig, Snapshot};
use crate::resources::JobFetcher;
use crate::ticker::{Derived, LiveDisplay};

/// Everything the job page shows for one snapshot at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub job: Arc<JobState>,
    pub metrics: JobMetrics,
    /// Set once at least one sample has been merged.
    pub preview_url: Option<String>,
    pub dump_url: Option<String>,
}

impl JobReport {
    pub fn new(api: &RenderApi, job: Arc<JobState>, now: Timestamp) -> Self {
        let metrics = JobMetrics::derive(&job, now);
        let preview_url = job
            .has_preview()
            .then(|| api.preview_url(&job.id, Some(job.spp)));
        let dump_url = job.dump_available().then(|| api.dump_url(&job.id));
        Self {
            job,
            metrics,
            preview_url,
            dump_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobDisplay {
    Loading,
    NotFound,
    Ready(JobReport),
}

impl JobDisplay {
    pub fn ready(&self) -> Option<&JobReport> {
        match self {
            Self::Ready(report) => Some(report),
            _ => None,
        }
    }
}

fn derive_display(api: &RenderApi, snapshot: &Snapshot<JobState>, now: Timestamp) -> Derived<JobDisplay> {
    match snapshot {
        Snapshot::Loading => Derived {
            value: JobDisplay::Loading,
            live: false,
        },
        Snapshot::NotFound => Derived {
            value: JobDisplay::NotFound,
            live: false,
        },
        Snapshot::Ready(job) => Derived {
            live: job.is_running(),
            value: JobDisplay::Ready(JobReport::new(api, Arc::clone(job), now)),
        },
    }
}

/// Polls one job at a time and keeps its metrics current.
pub struct JobView {
    poller: Poller<JobFetcher>,
    display: LiveDisplay<JobDisplay>,
}

impl JobView {
    pub fn new(api: Arc<RenderApi>, config: PollerConfig) -> Self {
        let poller = Poller::new(JobFetcher::new(Arc::clone(&api)), config);
        let display = LiveDisplay::spawn(poller.subscribe(), move |snapshot, now| {
            derive_display(&api, snapshot, now)
        });
        Self { poller, display }
    }

    /// Switch to another job, or to none. Results for the previous job are
    /// discarded from this point on.
    pub fn show(&mut self, id: Option<JobId>) {
        self.poller.set_key(id);
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.poller.key()
    }

    pub fn snapshot(&self) -> Snapshot<JobState> {
        self.poller.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<JobDisplay> {
        self.display.subscribe()
    }

    pub fn current(&self) -> JobDisplay {
        self.display.current().clone()
    }
}
