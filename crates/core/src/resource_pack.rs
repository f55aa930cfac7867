//! Resource packs offered by `GET /resourcepacks`.

use serde::{Deserialize, Serialize};

/// Label shown for "no resource pack" (the default textures).
pub const DEFAULT_PACK_LABEL: &str = "Vanilla";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePack {
    /// Identifier sent as the `texturepack` form field.
    pub name: String,
    pub display_name: String,
}

/// Find a pack by name or display name, case-insensitively.
pub fn find_pack<'a>(packs: &'a [ResourcePack], query: &str) -> Option<&'a ResourcePack> {
    let query = query.trim();
    packs
        .iter()
        .find(|p| p.name == query)
        .or_else(|| {
            packs.iter().find(|p| {
                p.name.eq_ignore_ascii_case(query) || p.display_name.eq_ignore_ascii_case(query)
            })
        })
}
