//! Async client for the ChunkyCloud render service.
//!
//! - [`api`]: REST calls over `reqwest`.
//! - [`poller`]: keyed periodic refresh with stale-result suppression.
//! - [`submit`]: single-flight job submission.
//! - [`views`]: state behind the job, stats and creation pages.

pub mod api;
pub mod config;
pub mod files;
pub mod poller;
pub mod resources;
pub mod submit;
pub mod ticker;
pub mod views;

pub use api::{ApiError, RenderApi};
pub use config::ClientConfig;
pub use poller::{Fetch, Fetched, Poller, PollerConfig, Snapshot};
pub use submit::{Navigator, SubmissionAssembler, SubmitError, SubmitOutcome};
