//! View-level state for the three pages: job detail, fleet stats and job
//! creation. Rendering is left to the front end.

pub mod create;
pub mod job;
pub mod stats;

pub use create::CreateJobView;
pub use job::{JobDisplay, JobReport, JobView};
pub use stats::StatsView;
