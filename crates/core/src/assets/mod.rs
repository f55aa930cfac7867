//! Scene asset handling for job creation.
//!
//! - [`entries`]: file identities and drop flattening.
//! - [`matcher`]: filename-convention and content-driven bundle building.

pub mod entries;
pub mod matcher;

pub use entries::{flatten_entries, DroppedEntry, FileSource, SceneFile};
pub use matcher::{
    locate_description, AssetInputs, AssetMatcher, AssetRequirements, FilePicker, MissingAsset,
    SceneAssetBundle, DEFAULT_TARGET_SPP,
};

/// Extension of the structured scene description.
pub const DESCRIPTION_EXTENSION: &str = "json";

/// Extension of the voxel octree file.
pub const OCTREE_EXTENSION: &str = "octree2";

/// Extension of the emitter grid file.
pub const EMITTER_GRID_EXTENSION: &str = "emittergrid";
