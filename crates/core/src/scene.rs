//! Scene description model.
//!
//! A scene description is the JSON file Chunky writes next to the octree.
//! The render service echoes (part of) it back in every job snapshot. The
//! content is loosely typed and sections go missing while a scene is still
//! being indexed, so every field here is optional and every reader must
//! null-guard.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Emitter sampling strategy value meaning "no emitter grid needed".
pub const EMITTER_SAMPLING_NONE: &str = "NONE";

/// Sky modes that render from a panoramic skymap image.
pub const PANORAMIC_SKY_MODES: &[&str] = &["SKYMAP_PANORAMIC", "SKYMAP_EQUIRECTANGULAR"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescription {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub ray_depth: Option<u32>,
    #[serde(default)]
    pub emitter_sampling_strategy: Option<String>,
    #[serde(default)]
    pub sky: Option<Sky>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sky {
    #[serde(default)]
    pub mode: Option<String>,
    /// Path of the skymap image as saved on the author's machine.
    #[serde(default)]
    pub skymap: Option<String>,
}

impl SceneDescription {
    /// Parse a scene description from raw file content.
    pub fn from_slice(content: &[u8]) -> Result<Self, CoreError> {
        Ok(serde_json::from_slice(content)?)
    }

    /// Both dimensions, when the scene has been indexed far enough to know them.
    pub fn resolution(&self) -> Option<(u32, u32)> {
        Some((self.width?, self.height?))
    }

    /// Total pixel count, if the resolution is known.
    pub fn pixel_count(&self) -> Option<u64> {
        self.resolution().map(|(w, h)| u64::from(w) * u64::from(h))
    }

    /// An emitter grid is needed whenever a sampling strategy other than
    /// `NONE` is set.
    pub fn requires_emitter_grid(&self) -> bool {
        self.emitter_sampling_strategy
            .as_deref()
            .is_some_and(|s| s != EMITTER_SAMPLING_NONE)
    }

    /// A skymap is needed when the sky renders from a panoramic image.
    pub fn requires_skymap(&self) -> bool {
        self.sky_mode()
            .is_some_and(|mode| PANORAMIC_SKY_MODES.contains(&mode))
    }

    pub fn sky_mode(&self) -> Option<&str> {
        self.sky.as_ref()?.mode.as_deref()
    }

    /// Final path component of the referenced skymap, accepting both `/` and
    /// `\` separators since descriptions are written on any OS.
    pub fn skymap_file_name(&self) -> Option<&str> {
        let path = self.sky.as_ref()?.skymap.as_deref()?;
        path.rsplit(['/', '\\']).next().filter(|name| !name.is_empty())
    }
}
