//! Composite commands: `all-metadata`, `all-tickets` and `all`.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use colored::Colorize;

use super::{load_context, metadata, runtime, tickets};
use crate::error::Result;
use crate::export::{ArtifactKind, ExportContext, MetadataKind, RunOptions};

fn heading(text: &str, json: bool) {
    if !json {
        println!("{}", format!("# {text}").green());
    }
}

async fn run_metadata(ctx: &ExportContext, json: bool) -> Result<()> {
    heading("Exporting account metadata", json);
    for kind in MetadataKind::ALL {
        metadata::run(ctx, kind, json).await?;
    }
    Ok(())
}

/// Tickets first, then children against the refreshed anchors.
///
/// Replies and comments are forced: a re-listed ticket may have new
/// ones, and the cutoff already limits the work to active tickets.
/// Attachments keep skip-if-exists since stored files never change.
async fn run_tickets(
    ctx: Arc<ExportContext>,
    since: Option<DateTime<Utc>>,
    json: bool,
) -> Result<()> {
    heading("Exporting tickets", json);
    tickets::run_tickets(&ctx, since, json).await?;

    heading("Exporting replies", json);
    tickets::run_children(
        Arc::clone(&ctx),
        ArtifactKind::Replies,
        RunOptions::new(since, true),
        json,
    )
    .await?;

    heading("Exporting comments", json);
    tickets::run_children(
        Arc::clone(&ctx),
        ArtifactKind::Comments,
        RunOptions::new(since, true),
        json,
    )
    .await?;

    heading("Exporting attachments", json);
    tickets::run_attachments(ctx, RunOptions::new(since, false), json).await
}

/// Execute `all-metadata`.
///
/// # Errors
///
/// Returns the first failing dump.
pub fn execute_metadata(config_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let ctx = load_context(config_path)?;
    runtime()?.block_on(run_metadata(&ctx, json))
}

/// Execute `all-tickets`.
///
/// # Errors
///
/// Returns an error if the config is invalid or a stage cannot start.
pub fn execute_tickets(
    since: Option<DateTime<Utc>>,
    config_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let ctx = Arc::new(load_context(config_path)?);
    runtime()?.block_on(run_tickets(ctx, since, json))
}

/// Execute `all`.
///
/// # Errors
///
/// Returns an error if metadata fails or a ticket stage cannot start.
pub fn execute_all(
    since: Option<DateTime<Utc>>,
    config_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let ctx = Arc::new(load_context(config_path)?);
    runtime()?.block_on(async {
        run_metadata(&ctx, json).await?;
        run_tickets(Arc::clone(&ctx), since, json).await
    })
}
