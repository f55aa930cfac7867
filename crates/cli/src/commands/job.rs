//! Job command - follow a render job.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use chunkycloud_client::views::{JobDisplay, JobReport, JobView};
use chunkycloud_client::{ClientConfig, RenderApi};
use chunkycloud_core::types::JobId;
use clap::Args;

use super::redraw;
use crate::render;

#[derive(Debug, Args)]
pub struct JobArgs {
    /// Job ID.
    pub id: String,

    /// Print one snapshot and exit.
    #[arg(long)]
    pub once: bool,
}

pub async fn execute(args: JobArgs, config: &ClientConfig) -> Result<()> {
    let api = Arc::new(RenderApi::new(config)?);
    let id = JobId::new(args.id);

    if args.once {
        let job = api
            .get_job(&id)
            .await
            .with_context(|| format!("Failed to load job {id}"))?;
        let Some(job) = job else {
            bail!("Job {id} not found");
        };
        let report = JobReport::new(&api, Arc::new(job), Utc::now());
        println!("{}", render::job(&report));
        return Ok(());
    }

    watch(api, config, id).await
}

/// Redraw the job every time its display changes. Returns once the job has
/// finished or was cancelled, or on Ctrl-C.
pub async fn watch(api: Arc<RenderApi>, config: &ClientConfig, id: JobId) -> Result<()> {
    let mut view = JobView::new(api, config.poller());
    view.show(Some(id.clone()));
    let mut rx = view.subscribe();

    loop {
        let done = match &*rx.borrow_and_update() {
            JobDisplay::Loading => false,
            JobDisplay::NotFound => bail!("Job {id} not found"),
            JobDisplay::Ready(report) => {
                redraw(&render::job(report));
                !report.job.is_running()
            }
        };
        if done {
            return Ok(());
        }

        tokio::select! {
            changed = rx.changed() => changed.context("Job view stopped")?,
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}
