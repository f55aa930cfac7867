//! Job snapshot as returned by `GET /jobs/{id}`.

use serde::{Deserialize, Serialize};

use crate::scene::SceneDescription;
use crate::types::{JobId, Timestamp};

/// Immutable snapshot of a render job. The poller replaces it wholesale on
/// every successful fetch; it is never patched field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobState {
    #[serde(rename = "_id", alias = "id")]
    pub id: JobId,
    pub created: Timestamp,
    #[serde(default)]
    pub finished_at: Option<Timestamp>,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub spp: u64,
    #[serde(default)]
    pub target_spp: u64,
    /// Sum of the render times of all merged dumps, in seconds.
    #[serde(default, rename = "renderTime")]
    pub render_time_seconds: Option<f64>,
    #[serde(default)]
    pub scene_description: Option<SceneDescription>,
    #[serde(default)]
    pub picture_only: bool,
}

impl JobState {
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Neither finished nor cancelled; live metrics keep ticking.
    pub fn is_running(&self) -> bool {
        !self.is_finished() && !self.cancelled
    }

    /// Pixel count of the scene, once the description has been indexed.
    pub fn pixel_count(&self) -> Option<u64> {
        self.scene_description.as_ref()?.pixel_count()
    }

    /// A preview image exists once at least one sample has been merged.
    pub fn has_preview(&self) -> bool {
        self.spp > 0
    }

    /// The render dump can be downloaded once samples exist, unless the job
    /// only produces a picture.
    pub fn dump_available(&self) -> bool {
        self.spp > 0 && !self.picture_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "_id": "5fd8a1c2e4b0",
        "created": "2021-01-02T10:00:00.000Z",
        "finishedAt": null,
        "cancelled": false,
        "spp": 120,
        "targetSpp": 500,
        "sceneDescription": {
            "width": 1920,
            "height": 1080,
            "rayDepth": 5,
            "emitterSamplingStrategy": "ONE",
            "sky": { "mode": "SIMULATED" }
        },
        "pictureOnly": false
    }"#;

    #[test]
    fn parses_service_payload() {
        let job: JobState = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(job.id.as_str(), "5fd8a1c2e4b0");
        assert_eq!(job.spp, 120);
        assert_eq!(job.target_spp, 500);
        assert!(job.finished_at.is_none());
        assert!(job.is_running());
        assert_eq!(job.pixel_count(), Some(1920 * 1080));
        assert_eq!(
            job.scene_description.as_ref().and_then(|d| d.ray_depth),
            Some(5)
        );
    }

    #[test]
    fn tolerates_missing_optional_sections() {
        let job: JobState =
            serde_json::from_str(r#"{"id": "a", "created": "2021-01-02T10:00:00Z"}"#).unwrap();
        assert_eq!(job.spp, 0);
        assert!(job.scene_description.is_none());
        assert!(job.pixel_count().is_none());
        assert!(!job.has_preview());
        assert!(!job.dump_available());
    }

    #[test]
    fn picture_only_jobs_have_no_dump() {
        let mut job: JobState = serde_json::from_str(SAMPLE).unwrap();
        assert!(job.dump_available());
        job.picture_only = true;
        assert!(job.has_preview());
        assert!(!job.dump_available());
    }

    #[test]
    fn render_time_maps_from_service_name() {
        let job: JobState = serde_json::from_str(
            r#"{"_id": "a", "created": "2021-01-02T10:00:00Z", "renderTime": 12.5}"#,
        )
        .unwrap();
        assert_eq!(job.render_time_seconds, Some(12.5));
    }
}
