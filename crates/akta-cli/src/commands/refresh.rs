use std::sync::Arc;
use std::time::Duration;

use akta_core::RefreshStatus;
use anyhow::Context;
use tokio::sync::watch;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{RefreshArgs, WatchArgs};
use crate::context::AppContext;
use crate::output::output;

/// Handle `akta refresh`.
pub async fn handle(args: &RefreshArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if args.source.is_none() && !ctx.config.refresh.is_configured() {
        anyhow::bail!("no sources tracked; add [[refresh.sources]] to the config");
    }
    let report = ctx.scheduler.trigger_refresh(args.source.as_deref()).await;
    output(&report, flags.format)?;

    if report.has_failures() {
        anyhow::bail!(
            "{} of {} sources failed; previous versions stay servable",
            report.count(RefreshStatus::Failed),
            report.outcomes.len()
        );
    }
    Ok(())
}

/// Handle `akta watch`: run the scheduler until Ctrl-C.
pub async fn watch(args: &WatchArgs, ctx: &AppContext) -> anyhow::Result<()> {
    if ctx.scheduler.sources().is_empty() {
        anyhow::bail!("no sources tracked; add [[refresh.sources]] to the config");
    }
    let interval = Duration::from_secs(args.interval_secs.unwrap_or(ctx.config.refresh.interval_secs));
    let (shutdown, rx) = watch::channel(false);
    let task = Arc::clone(&ctx.scheduler).spawn(interval, rx);

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    tracing::info!("cli: shutdown requested");
    let _ = shutdown.send(true);
    task.await.context("refresh scheduler task panicked")?;
    Ok(())
}
