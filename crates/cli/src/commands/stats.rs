//! Stats command - follow render farm statistics.

use std::sync::Arc;

use anyhow::{Context, Result};
use chunkycloud_client::views::StatsView;
use chunkycloud_client::{ClientConfig, RenderApi};
use clap::Args;

use super::redraw;
use crate::render;

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Print the current statistics once and exit.
    #[arg(long)]
    pub once: bool,
}

pub async fn execute(args: StatsArgs, config: &ClientConfig) -> Result<()> {
    let api = Arc::new(RenderApi::new(config)?);

    if args.once {
        let stats = api.get_stats().await.context("Failed to load statistics")?;
        println!("{}", render::stats(&stats));
        return Ok(());
    }

    let view = StatsView::new(api, config.poller());
    let mut rx = view.subscribe();
    loop {
        if let Some(stats) = rx.borrow_and_update().ready() {
            redraw(&render::stats(stats));
        }
        tokio::select! {
            changed = rx.changed() => changed.context("Stats poller stopped")?,
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}
