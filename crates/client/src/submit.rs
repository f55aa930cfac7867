//! Job submission with a single request in flight at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chunkycloud_core::assets::{AssetRequirements, SceneAssetBundle};
use chunkycloud_core::submission::{BundleError, JobSubmission};
use chunkycloud_core::types::JobId;

use crate::api::{ApiError, RenderApi};
use crate::files::build_form;

/// Moves the user to the page of a newly created job.
pub trait Navigator: Send + Sync {
    fn navigate_to_job(&self, id: &JobId);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(JobId),
    /// Another submission is still running; nothing was sent.
    AlreadyInFlight,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] BundleError),

    /// The service refused the job. `body` is shown to the user verbatim.
    #[error("Job was rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Could not reach the render service: {0}")]
    Transport(ApiError),

    #[error("Failed to read scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Job was created but the response carried no job id")]
    MissingJobId,
}

impl From<ApiError> for SubmitError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Status { status, body } => Self::Rejected { status, body },
            ApiError::Decode(_) => Self::MissingJobId,
            other => Self::Transport(other),
        }
    }
}

/// Releases the in-flight flag on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Sends completed bundles to `POST /jobs`.
pub struct SubmissionAssembler {
    api: Arc<RenderApi>,
    in_flight: AtomicBool,
}

impl SubmissionAssembler {
    pub fn new(api: Arc<RenderApi>) -> Self {
        Self {
            api,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit a bundle and navigate to the created job.
    ///
    /// Returns [`SubmitOutcome::AlreadyInFlight`] without doing anything if
    /// a previous call has not finished yet. Pre-checks run before any file
    /// is read; the service has the final word on validity.
    pub async fn submit(
        &self,
        bundle: &SceneAssetBundle,
        requirements: AssetRequirements,
        api_key: &str,
        navigator: &dyn Navigator,
    ) -> Result<SubmitOutcome, SubmitError> {
        let Some(_guard) = InFlightGuard::claim(&self.in_flight) else {
            tracing::debug!("Submission already in flight, ignoring");
            return Ok(SubmitOutcome::AlreadyInFlight);
        };

        let submission = JobSubmission::assemble(bundle, requirements, api_key)?;
        let form = build_form(&submission).await?;

        match self.api.create_job(form, &submission.api_key).await {
            Ok(id) => {
                tracing::info!(job_id = %id, target_spp = bundle.target_spp, "Job created");
                navigator.navigate_to_job(&id);
                Ok(SubmitOutcome::Created(id))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Job submission failed");
                Err(e.into())
            }
        }
    }
}
