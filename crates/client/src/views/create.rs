//! Job creation view state.
//!
//! Owns the asset matcher, the drag indicator, the form's text inputs and
//! the submission assembler. All file reading happens here, before the
//! matcher sees the result.

use std::path::PathBuf;
use std::sync::Arc;

use chunkycloud_core::assets::{AssetMatcher, DroppedEntry, SceneFile};
use chunkycloud_core::error::CoreError;
use chunkycloud_core::greeting::pick_greeting;
use chunkycloud_core::resource_pack::{find_pack, ResourcePack};
use chunkycloud_core::submission::parse_target_spp;
use rand::Rng;

use crate::api::{ApiError, RenderApi};
use crate::files;
use crate::submit::{Navigator, SubmissionAssembler, SubmitError, SubmitOutcome};

pub struct CreateJobView {
    greeting: &'static str,
    drag_active: bool,
    matcher: AssetMatcher,
    api_key: String,
    resource_packs: Vec<ResourcePack>,
    last_error: Option<String>,
    api: Arc<RenderApi>,
    assembler: Arc<SubmissionAssembler>,
}

impl CreateJobView {
    /// The greeting is picked once here and kept for the view's lifetime.
    pub fn new<R: Rng + ?Sized>(api: Arc<RenderApi>, rng: &mut R) -> Self {
        Self {
            greeting: pick_greeting(rng),
            drag_active: false,
            matcher: AssetMatcher::new(),
            api_key: String::new(),
            resource_packs: Vec::new(),
            last_error: None,
            assembler: Arc::new(SubmissionAssembler::new(Arc::clone(&api))),
            api,
        }
    }

    pub fn greeting(&self) -> &'static str {
        self.greeting
    }

    pub fn matcher(&self) -> &AssetMatcher {
        &self.matcher
    }

    /// Shared handle to the assembler, for callers that submit from
    /// several tasks.
    pub fn assembler(&self) -> &Arc<SubmissionAssembler> {
        &self.assembler
    }

    pub fn resource_packs(&self) -> &[ResourcePack] {
        &self.resource_packs
    }

    /// User-visible message of the last failed submission.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ---- drag and drop ----

    pub fn is_drag_active(&self) -> bool {
        self.drag_active
    }

    pub fn drag_enter(&mut self) {
        self.drag_active = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_active = false;
    }

    pub async fn drop_entries(&mut self, entries: Vec<DroppedEntry>) {
        self.drag_active = false;
        files::match_drop(&mut self.matcher, entries).await;
    }

    /// Drop paths from the local filesystem.
    pub async fn drop_paths(&mut self, paths: &[PathBuf]) -> std::io::Result<()> {
        self.drag_active = false;
        let entries = files::read_dropped(paths).await?;
        self.drop_entries(entries).await;
        Ok(())
    }

    // ---- pickers ----

    pub async fn pick_description(&mut self, file: SceneFile) {
        files::pick_description(&mut self.matcher, file).await;
    }

    pub fn pick_octree(&mut self, file: Option<SceneFile>) {
        self.matcher.set_octree(file);
    }

    /// Returns `false` if the picker is disabled.
    pub fn pick_emitter_grid(&mut self, file: Option<SceneFile>) -> bool {
        self.matcher.set_emitter_grid(file)
    }

    pub fn pick_skymap(&mut self, file: Option<SceneFile>) -> bool {
        self.matcher.set_skymap(file)
    }

    // ---- text inputs ----

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = api_key.into();
    }

    /// Parse and apply the target spp input. Invalid input leaves the
    /// current value unchanged.
    pub fn set_target_spp_input(&mut self, input: &str) -> Result<u32, CoreError> {
        let target_spp = parse_target_spp(input)?;
        self.matcher.set_target_spp(target_spp);
        Ok(target_spp)
    }

    /// Select a resource pack by name or display name. `None` (or an empty
    /// query) selects the default textures.
    pub fn select_resource_pack(&mut self, query: Option<&str>) -> Result<(), CoreError> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let pack = match query {
            None => None,
            Some(query) => {
                let pack = find_pack(&self.resource_packs, query).ok_or_else(|| {
                    CoreError::Validation(format!("Unknown resource pack '{query}'"))
                })?;
                Some(pack.name.clone())
            }
        };
        self.matcher.set_resource_pack(pack);
        Ok(())
    }

    pub async fn load_resource_packs(&mut self) -> Result<&[ResourcePack], ApiError> {
        self.resource_packs = self.api.list_resource_packs().await?;
        tracing::debug!(count = self.resource_packs.len(), "Loaded resource packs");
        Ok(&self.resource_packs)
    }

    // ---- submission ----

    /// Submit the current bundle.
    ///
    /// On success the bundle is consumed and the form starts over (target
    /// spp and resource pack carry over). On failure the bundle is kept so
    /// the user can fix it and try again.
    pub async fn submit(&mut self, navigator: &dyn Navigator) -> Result<SubmitOutcome, SubmitError> {
        let result = self
            .assembler
            .submit(
                self.matcher.bundle(),
                self.matcher.requirements(),
                &self.api_key,
                navigator,
            )
            .await;

        match &result {
            Ok(SubmitOutcome::Created(_)) => {
                self.last_error = None;
                self.matcher.take_bundle();
            }
            Ok(SubmitOutcome::AlreadyInFlight) => {}
            Err(SubmitError::Rejected { body, .. }) => self.last_error = Some(body.clone()),
            Err(e) => self.last_error = Some(e.to_string()),
        }
        result
    }
}
