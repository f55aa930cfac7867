//! [`Fetch`] implementations over [`RenderApi`].

use std::sync::Arc;

use async_trait::async_trait;
use chunkycloud_core::job::JobState;
use chunkycloud_core::stats::AggregateStats;
use chunkycloud_core::types::JobId;

use crate::api::{ApiError, RenderApi};
use crate::poller::{Fetch, Fetched};

/// Fetches one job by id. A 404 becomes [`Fetched::NotFound`].
#[derive(Debug, Clone)]
pub struct JobFetcher {
    api: Arc<RenderApi>,
}

impl JobFetcher {
    pub fn new(api: Arc<RenderApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Fetch for JobFetcher {
    type Key = JobId;
    type Value = JobState;

    async fn fetch(&self, key: &JobId) -> Result<Fetched<JobState>, ApiError> {
        Ok(match self.api.get_job(key).await? {
            Some(job) => Fetched::Found(job),
            None => Fetched::NotFound,
        })
    }
}

/// Fetches the fleet statistics. There is a single stats resource, so the
/// key is `()`.
#[derive(Debug, Clone)]
pub struct StatsFetcher {
    api: Arc<RenderApi>,
}

impl StatsFetcher {
    pub fn new(api: Arc<RenderApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Fetch for StatsFetcher {
    type Key = ();
    type Value = AggregateStats;

    async fn fetch(&self, _key: &()) -> Result<Fetched<AggregateStats>, ApiError> {
        self.api.get_stats().await.map(Fetched::Found)
    }
}
