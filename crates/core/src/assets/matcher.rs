//! Scene-asset matching: turns drops and picker selections into a
//! [`SceneAssetBundle`].
//!
//! Companion files are found by exact scene name: a description
//! `castle.json` pairs with `castle.octree2` and `castle.emittergrid`,
//! nothing else. Only the extensions ignore ASCII case.
//! Whether the emitter grid and skymap are needed at all is read from the
//! description's content. Reading that content is the caller's job (it is an
//! async suspension point), so every method here takes the bytes it needs.

use crate::scene::SceneDescription;

use super::entries::SceneFile;
use super::{DESCRIPTION_EXTENSION, EMITTER_GRID_EXTENSION, OCTREE_EXTENSION};

/// Samples per pixel preselected for a new bundle.
pub const DEFAULT_TARGET_SPP: u32 = 500;

/// Which optional companions the current description asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetRequirements {
    pub emitter_grid: bool,
    pub skymap: bool,
}

impl AssetRequirements {
    /// Derive requiredness from a parsed description.
    pub fn of(description: &SceneDescription) -> Self {
        Self {
            emitter_grid: description.requires_emitter_grid(),
            skymap: description.requires_skymap(),
        }
    }
}

/// State of one file input control bound to a bundle field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePicker {
    pub enabled: bool,
    /// Name of the file currently shown in the control.
    pub selected: Option<String>,
}

impl FilePicker {
    fn enabled() -> Self {
        Self {
            enabled: true,
            selected: None,
        }
    }

    fn show(&mut self, file: Option<&SceneFile>) {
        self.selected = file.map(|f| f.name().to_string());
    }
}

/// The input controls of the creation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInputs {
    pub description: FilePicker,
    pub octree: FilePicker,
    pub emitter_grid: FilePicker,
    pub skymap: FilePicker,
}

impl Default for AssetInputs {
    fn default() -> Self {
        Self {
            description: FilePicker::enabled(),
            octree: FilePicker::enabled(),
            emitter_grid: FilePicker::default(),
            skymap: FilePicker::default(),
        }
    }
}

/// Everything a create-job request needs besides the credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneAssetBundle {
    pub description: Option<SceneFile>,
    pub octree: Option<SceneFile>,
    pub emitter_grid: Option<SceneFile>,
    pub skymap: Option<SceneFile>,
    /// Resource pack name; `None` renders with the default textures.
    pub resource_pack: Option<String>,
    pub target_spp: u32,
}

impl Default for SceneAssetBundle {
    fn default() -> Self {
        Self {
            description: None,
            octree: None,
            emitter_grid: None,
            skymap: None,
            resource_pack: None,
            target_spp: DEFAULT_TARGET_SPP,
        }
    }
}

/// A bundle field that must be filled before submitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingAsset {
    Description,
    Octree,
    EmitterGrid,
    Skymap,
}

impl MissingAsset {
    pub fn label(self) -> &'static str {
        match self {
            Self::Description => "scene description",
            Self::Octree => "octree",
            Self::EmitterGrid => "emitter grid",
            Self::Skymap => "skymap",
        }
    }
}

/// The unique file whose name carries the description extension.
///
/// Returns `None` if there is no such file or more than one.
pub fn locate_description(files: &[SceneFile]) -> Option<&SceneFile> {
    unique_with_extension(files, DESCRIPTION_EXTENSION)
}

/// Scene name of a description file: its name minus the extension.
pub fn scene_name(description: &SceneFile) -> &str {
    description
        .stem(DESCRIPTION_EXTENSION)
        .unwrap_or(description.name())
}

/// The companion of `scene_name` carrying `extension`.
pub fn find_companion<'a>(
    files: &'a [SceneFile],
    scene_name: &str,
    extension: &str,
) -> Option<&'a SceneFile> {
    files.iter().find(|f| f.stem(extension) == Some(scene_name))
}

fn unique_with_extension<'a>(files: &'a [SceneFile], extension: &str) -> Option<&'a SceneFile> {
    let mut matches = files.iter().filter(|f| f.has_extension(extension));
    let first = matches.next()?;
    matches.next().is_none().then_some(first)
}

fn find_named<'a>(files: &'a [SceneFile], name: &str) -> Option<&'a SceneFile> {
    files.iter().find(|f| f.name() == name)
}

/// Incrementally built creation-session state: the bundle, the derived
/// requiredness, and the input controls bound to it.
#[derive(Debug, Clone, Default)]
pub struct AssetMatcher {
    bundle: SceneAssetBundle,
    requirements: AssetRequirements,
    inputs: AssetInputs,
    description: Option<SceneDescription>,
}

impl AssetMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bundle(&self) -> &SceneAssetBundle {
        &self.bundle
    }

    pub fn requirements(&self) -> AssetRequirements {
        self.requirements
    }

    pub fn inputs(&self) -> &AssetInputs {
        &self.inputs
    }

    /// The parsed content of the current description, if it parsed.
    pub fn description(&self) -> Option<&SceneDescription> {
        self.description.as_ref()
    }

    /// Match a flattened drop.
    ///
    /// `description_content` is the content of [`locate_description`]'s
    /// result (or `None` if it could not be read). With no description in the
    /// drop, octree and emitter grid are picked by extension alone and the
    /// current requiredness is left untouched; a grid found this way enables
    /// its picker so it can be changed by hand. Matching the same drop twice
    /// yields the same bundle.
    pub fn match_drop(&mut self, files: &[SceneFile], description_content: Option<&[u8]>) {
        let Some(description) = locate_description(files) else {
            if let Some(octree) = unique_with_extension(files, OCTREE_EXTENSION) {
                self.set_octree(Some(octree.clone()));
            }
            if let Some(grid) = unique_with_extension(files, EMITTER_GRID_EXTENSION) {
                self.inputs.emitter_grid.enabled = true;
                self.store_emitter_grid(Some(grid.clone()));
            }
            return;
        };

        let name = scene_name(description);
        let parsed = parse_description(description_content);

        if let Some(octree) = find_companion(files, name, OCTREE_EXTENSION) {
            self.set_octree(Some(octree.clone()));
        }
        if let Some(grid) = find_companion(files, name, EMITTER_GRID_EXTENSION) {
            self.store_emitter_grid(Some(grid.clone()));
        }
        if let Some(skymap) = parsed
            .as_ref()
            .and_then(SceneDescription::skymap_file_name)
            .and_then(|skymap_name| find_named(files, skymap_name))
        {
            self.store_skymap(Some(skymap.clone()));
        }

        self.apply_description(description.clone(), parsed);
    }

    /// Manual change of the description picker. Only the description field
    /// changes; requiredness is recomputed from the new content.
    pub fn set_description(&mut self, file: SceneFile, content: Option<&[u8]>) {
        let parsed = parse_description(content);
        self.apply_description(file, parsed);
    }

    pub fn set_octree(&mut self, file: Option<SceneFile>) {
        self.inputs.octree.show(file.as_ref());
        self.bundle.octree = file;
    }

    /// Manual change of the emitter-grid picker.
    ///
    /// Returns `false` (and changes nothing) while the picker is disabled
    /// because the description does not need a grid.
    pub fn set_emitter_grid(&mut self, file: Option<SceneFile>) -> bool {
        if !self.inputs.emitter_grid.enabled {
            return false;
        }
        self.store_emitter_grid(file);
        true
    }

    /// Manual change of the skymap picker. Same rules as
    /// [`set_emitter_grid`](Self::set_emitter_grid).
    pub fn set_skymap(&mut self, file: Option<SceneFile>) -> bool {
        if !self.inputs.skymap.enabled {
            return false;
        }
        self.store_skymap(file);
        true
    }

    pub fn set_target_spp(&mut self, target_spp: u32) {
        self.bundle.target_spp = target_spp;
    }

    /// Select a resource pack. Empty names mean the default textures.
    pub fn set_resource_pack(&mut self, pack: Option<String>) {
        self.bundle.resource_pack = pack.filter(|p| !p.trim().is_empty());
    }

    /// Required fields that are still empty.
    pub fn missing(&self) -> Vec<MissingAsset> {
        let mut missing = Vec::new();
        if self.bundle.description.is_none() {
            missing.push(MissingAsset::Description);
        }
        if self.bundle.octree.is_none() {
            missing.push(MissingAsset::Octree);
        }
        if self.requirements.emitter_grid && self.bundle.emitter_grid.is_none() {
            missing.push(MissingAsset::EmitterGrid);
        }
        if self.requirements.skymap && self.bundle.skymap.is_none() {
            missing.push(MissingAsset::Skymap);
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Hand the bundle over (after a successful submission) and start a fresh
    /// session. Target spp and resource pack carry over.
    pub fn take_bundle(&mut self) -> SceneAssetBundle {
        let next = SceneAssetBundle {
            resource_pack: self.bundle.resource_pack.clone(),
            target_spp: self.bundle.target_spp,
            ..SceneAssetBundle::default()
        };
        self.requirements = AssetRequirements::default();
        self.inputs = AssetInputs::default();
        self.description = None;
        std::mem::replace(&mut self.bundle, next)
    }

    // ---- private helpers ----

    fn apply_description(&mut self, file: SceneFile, parsed: Option<SceneDescription>) {
        self.inputs.description.show(Some(&file));
        self.bundle.description = Some(file);
        self.requirements = parsed.as_ref().map(AssetRequirements::of).unwrap_or_default();
        self.description = parsed;

        self.inputs.emitter_grid.enabled = self.requirements.emitter_grid;
        if !self.requirements.emitter_grid {
            self.store_emitter_grid(None);
        }
        self.inputs.skymap.enabled = self.requirements.skymap;
        if !self.requirements.skymap {
            self.store_skymap(None);
        }
    }

    fn store_emitter_grid(&mut self, file: Option<SceneFile>) {
        self.inputs.emitter_grid.show(file.as_ref());
        self.bundle.emitter_grid = file;
    }

    fn store_skymap(&mut self, file: Option<SceneFile>) {
        self.inputs.skymap.show(file.as_ref());
        self.bundle.skymap = file;
    }
}

/// Unreadable or unparsable content counts as "no requirements".
fn parse_description(content: Option<&[u8]>) -> Option<SceneDescription> {
    SceneDescription::from_slice(content?).ok()
}
