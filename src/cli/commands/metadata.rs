//! Metadata dump commands (users, labels, teams, snippets, emails).

use std::path::PathBuf;

use super::{load_context, print_result, runtime};
use crate::error::Result;
use crate::export::{ExportContext, MetadataKind, export_metadata};

/// Execute a single metadata dump.
///
/// # Errors
///
/// Returns the first error; a metadata dump has nothing to salvage.
pub fn execute(kind: MetadataKind, config_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let ctx = load_context(config_path)?;
    runtime()?.block_on(run(&ctx, kind, json))
}

pub(crate) async fn run(ctx: &ExportContext, kind: MetadataKind, json: bool) -> Result<()> {
    let export = export_metadata(ctx, kind).await?;
    print_result(&export, json)
}
