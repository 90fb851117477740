use akta_refresh::fetch::content_type_for;
use akta_refresh::normalize::{statute_document, to_text};
use akta_refresh::{Fetched, ingest};
use anyhow::Context;
use chrono::Utc;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::IngestArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `akta ingest`: a local file through the same put-then-reindex path
/// as a refresh.
pub async fn handle(args: &IngestArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let path = args
        .file
        .canonicalize()
        .with_context(|| format!("cannot find {}", args.file.display()))?;
    let body = tokio::fs::read(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let url = args
        .url
        .clone()
        .unwrap_or_else(|| format!("file://{}", path.display()));

    let fetched = Fetched {
        url: url.clone(),
        content_type: content_type_for(&path),
        body,
    };
    let text = to_text(&fetched)?;
    let title = args.title.clone().unwrap_or_else(|| {
        path.file_stem()
            .map_or_else(|| url.clone(), |s| s.to_string_lossy().into_owned())
    });
    let document = statute_document(&url, title, &text, Utc::now());

    let outcome = ingest(&ctx.store, &ctx.indexer, &document)
        .await
        .with_context(|| format!("failed to ingest {}", path.display()))?;
    output(&outcome, flags.format)
}
