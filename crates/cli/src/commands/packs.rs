//! Packs command - list resource packs.

use anyhow::{Context, Result};
use chunkycloud_client::{ClientConfig, RenderApi};

use crate::render;

pub async fn execute(config: &ClientConfig) -> Result<()> {
    let api = RenderApi::new(config)?;
    let packs = api
        .list_resource_packs()
        .await
        .context("Failed to load resource packs")?;

    println!("{}", render::resource_packs(&packs));
    Ok(())
}
