//! Ticket, reply, comment and attachment export commands.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{load_context, print_result, runtime};
use crate::cli::ChildArgs;
use crate::error::Result;
use crate::export::{
    ArtifactKind, ExportContext, RunOptions, export_attachments, export_children, export_tickets,
};

/// Execute `export-tickets`.
///
/// # Errors
///
/// Returns an error if the config is invalid or the first page fails.
pub fn execute_tickets(
    since: Option<DateTime<Utc>>,
    config_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let ctx = load_context(config_path)?;
    runtime()?.block_on(run_tickets(&ctx, since, json))
}

/// Execute `export-replies` or `export-comments`.
///
/// # Errors
///
/// Returns an error if the config is invalid or the tree cannot be
/// scanned. Individual tickets never fail the command.
pub fn execute_children(
    kind: ArtifactKind,
    args: ChildArgs,
    config_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let ctx = Arc::new(load_context(config_path)?);
    let options = RunOptions::new(args.since.since_date, args.force);
    runtime()?.block_on(run_children(ctx, kind, options, json))
}

/// Execute `export-attachments`.
///
/// # Errors
///
/// Returns an error if the config is invalid or the tree cannot be
/// scanned.
pub fn execute_attachments(
    args: ChildArgs,
    config_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let ctx = Arc::new(load_context(config_path)?);
    let options = RunOptions::new(args.since.since_date, args.force);
    runtime()?.block_on(run_attachments(ctx, options, json))
}

pub(crate) async fn run_tickets(
    ctx: &ExportContext,
    since: Option<DateTime<Utc>>,
    json: bool,
) -> Result<()> {
    let summary = export_tickets(ctx, since).await?;
    print_result(&summary, json)
}

pub(crate) async fn run_children(
    ctx: Arc<ExportContext>,
    kind: ArtifactKind,
    options: RunOptions,
    json: bool,
) -> Result<()> {
    let summary = export_children(ctx, kind, options).await?;
    print_result(&summary, json)
}

pub(crate) async fn run_attachments(
    ctx: Arc<ExportContext>,
    options: RunOptions,
    json: bool,
) -> Result<()> {
    let summary = export_attachments(ctx, options).await?;
    print_result(&summary, json)
}
