//! Create-job request assembly and client-side pre-checks.
//!
//! [`JobSubmission::assemble`] turns a bundle into the ordered list of
//! multipart fields for `POST /jobs`. It does not read any file content;
//! the HTTP layer streams the [`SceneFile`]s when it builds the real form.
//! These checks are best-effort: the render service re-validates everything.

use serde::Deserialize;

use crate::assets::{AssetRequirements, MissingAsset, SceneAssetBundle, SceneFile};
use crate::error::CoreError;
use crate::types::JobId;

/// Header carrying the user's API key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

pub const MIN_TARGET_SPP: u32 = 1;
pub const MAX_TARGET_SPP: u32 = 1000;

// ── Multipart field names ────────────────────────────────────────────

pub const FIELD_SCENE: &str = "scene";
pub const FIELD_OCTREE: &str = "octree";
pub const FIELD_EMITTER_GRID: &str = "emittergrid";
pub const FIELD_SKYMAP: &str = "skymap";
pub const FIELD_TARGET_SPP: &str = "targetSpp";
pub const FIELD_TEXTUREPACK: &str = "texturepack";

/// Reasons a bundle cannot be submitted yet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BundleError {
    #[error("An API key is required")]
    MissingApiKey,

    #[error("Missing {}", .0.label())]
    Missing(MissingAsset),

    #[error("Samples per pixel must be between 1 and 1000, got {0}")]
    TargetSppOutOfRange(u32),
}

/// Value of a single multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    File(SceneFile),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: &'static str,
    pub value: FormValue,
}

/// A validated create-job request, not yet encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSubmission {
    pub api_key: String,
    pub fields: Vec<FormField>,
}

impl JobSubmission {
    /// Validate `bundle` and lay out its multipart fields.
    ///
    /// The emitter grid and skymap are sent only when the description asks
    /// for them and they are selected. The resource pack is sent only when a
    /// non-default pack is chosen.
    pub fn assemble(
        bundle: &SceneAssetBundle,
        requirements: AssetRequirements,
        api_key: &str,
    ) -> Result<Self, BundleError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(BundleError::MissingApiKey);
        }
        let description = bundle
            .description
            .as_ref()
            .ok_or(BundleError::Missing(MissingAsset::Description))?;
        let octree = bundle
            .octree
            .as_ref()
            .ok_or(BundleError::Missing(MissingAsset::Octree))?;
        let target_spp = validate_target_spp(bundle.target_spp)?;

        let emitter_grid = companion(
            requirements.emitter_grid,
            bundle.emitter_grid.as_ref(),
            MissingAsset::EmitterGrid,
        )?;
        let skymap = companion(requirements.skymap, bundle.skymap.as_ref(), MissingAsset::Skymap)?;

        let mut fields = vec![
            file_field(FIELD_SCENE, description),
            file_field(FIELD_OCTREE, octree),
        ];
        if let Some(grid) = emitter_grid {
            fields.push(file_field(FIELD_EMITTER_GRID, grid));
        }
        if let Some(skymap) = skymap {
            fields.push(file_field(FIELD_SKYMAP, skymap));
        }
        fields.push(FormField {
            name: FIELD_TARGET_SPP,
            value: FormValue::Text(target_spp.to_string()),
        });
        if let Some(pack) = bundle.resource_pack.as_deref().filter(|p| !p.is_empty()) {
            fields.push(FormField {
                name: FIELD_TEXTUREPACK,
                value: FormValue::Text(pack.to_string()),
            });
        }

        Ok(Self {
            api_key: api_key.to_string(),
            fields,
        })
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FormValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

fn companion<'a>(
    required: bool,
    file: Option<&'a SceneFile>,
    missing: MissingAsset,
) -> Result<Option<&'a SceneFile>, BundleError> {
    match (required, file) {
        (false, _) => Ok(None),
        (true, Some(file)) => Ok(Some(file)),
        (true, None) => Err(BundleError::Missing(missing)),
    }
}

fn file_field(name: &'static str, file: &SceneFile) -> FormField {
    FormField {
        name,
        value: FormValue::File(file.clone()),
    }
}

/// Check that a target spp lies within the accepted range.
pub fn validate_target_spp(target_spp: u32) -> Result<u32, BundleError> {
    if (MIN_TARGET_SPP..=MAX_TARGET_SPP).contains(&target_spp) {
        Ok(target_spp)
    } else {
        Err(BundleError::TargetSppOutOfRange(target_spp))
    }
}

/// Parse a user-typed target spp (a base-10 integer within range).
pub fn parse_target_spp(input: &str) -> Result<u32, CoreError> {
    let value: u32 = input
        .trim()
        .parse()
        .map_err(|_| CoreError::Validation(format!("'{input}' is not a whole number")))?;
    validate_target_spp(value).map_err(|e| CoreError::Validation(e.to_string()))
}

/// Body of a `201 Created` response to `POST /jobs`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedJob {
    #[serde(rename = "_id", alias = "id")]
    pub id: JobId,
}
