//! Core types and pure logic for the ChunkyCloud render-job client.
//!
//! Nothing in this crate performs I/O. The HTTP client, the poller and the
//! file readers live in `chunkycloud-client`.

pub mod assets;
pub mod error;
pub mod greeting;
pub mod job;
pub mod metrics;
pub mod resource_pack;
pub mod scene;
pub mod stats;
pub mod submission;
pub mod types;
