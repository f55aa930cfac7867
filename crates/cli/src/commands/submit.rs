//! Submit command - create a render job from scene files.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chunkycloud_client::submit::{Navigator, SubmitOutcome};
use chunkycloud_client::views::CreateJobView;
use chunkycloud_client::{ClientConfig, RenderApi};
use chunkycloud_core::assets::{MissingAsset, SceneFile};
use chunkycloud_core::types::JobId;
use clap::Args;

use crate::render;

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Scene files, or a single scene directory, matched by file name.
    #[arg(required_unless_present = "description")]
    pub paths: Vec<PathBuf>,

    /// Scene description (.json), replacing the one found in `paths`.
    #[arg(long)]
    pub description: Option<PathBuf>,

    /// Octree file (.octree2).
    #[arg(long)]
    pub octree: Option<PathBuf>,

    /// Emitter grid file (.emittergrid). Only used if the scene needs one.
    #[arg(long)]
    pub emitter_grid: Option<PathBuf>,

    /// Skymap image. Only used if the scene has a panoramic sky.
    #[arg(long)]
    pub skymap: Option<PathBuf>,

    /// Samples per pixel to render (1-1000).
    #[arg(long)]
    pub target_spp: Option<String>,

    /// Resource pack name or display name.
    #[arg(long)]
    pub resource_pack: Option<String>,

    /// API key (overrides `CHUNKYCLOUD_API_KEY`).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Follow the job after it has been created.
    #[arg(long)]
    pub watch: bool,
}

struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn navigate_to_job(&self, id: &JobId) {
        println!("Created job {id}");
    }
}

pub async fn execute(args: SubmitArgs, config: &ClientConfig) -> Result<()> {
    let api_key = args
        .api_key
        .or_else(|| config.api_key.clone())
        .context("An API key is required. Set CHUNKYCLOUD_API_KEY or use --api-key")?;

    let api = Arc::new(RenderApi::new(config)?);
    let mut view = CreateJobView::new(Arc::clone(&api), &mut rand::rng());
    println!("{}", view.greeting());
    view.set_api_key(api_key);

    if !args.paths.is_empty() {
        view.drag_enter();
        view.drop_paths(&args.paths)
            .await
            .context("Failed to read scene files")?;
    }
    if let Some(path) = args.description {
        view.pick_description(SceneFile::from_path(path)).await;
    }
    if let Some(path) = args.octree {
        view.pick_octree(Some(SceneFile::from_path(path)));
    }
    if let Some(path) = args.emitter_grid {
        if !view.pick_emitter_grid(Some(SceneFile::from_path(path))) {
            tracing::warn!("Scene does not use an emitter grid, ignoring --emitter-grid");
        }
    }
    if let Some(path) = args.skymap {
        if !view.pick_skymap(Some(SceneFile::from_path(path))) {
            tracing::warn!("Scene has no panoramic sky, ignoring --skymap");
        }
    }
    if let Some(input) = &args.target_spp {
        view.set_target_spp_input(input)?;
    }
    if let Some(pack) = &args.resource_pack {
        view.load_resource_packs()
            .await
            .context("Failed to load resource packs")?;
        view.select_resource_pack(Some(pack))?;
    }

    println!("{}", render::bundle(view.matcher()));
    let missing = view.matcher().missing();
    if !missing.is_empty() {
        let labels: Vec<_> = missing.into_iter().map(MissingAsset::label).collect();
        bail!("Missing {}", labels.join(", "));
    }

    let id = match view.submit(&PrintNavigator).await? {
        SubmitOutcome::Created(id) => id,
        SubmitOutcome::AlreadyInFlight => bail!("A submission is already in progress"),
    };

    if args.watch {
        super::job::watch(api, config, id).await?;
    } else {
        println!("{}", api.preview_url(&id, None));
    }
    Ok(())
}
