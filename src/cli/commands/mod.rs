//! Command implementations.
//!
//! Commands are synchronous entry points; the ones that talk to the API
//! build a tokio runtime and block on the export pipeline.

pub mod all;
pub mod completions;
pub mod metadata;
pub mod tickets;
pub mod version;

use std::fmt::Display;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::config::{load_config, resolve_config_path};
use crate::error::{Error, Result};
use crate::export::ExportContext;

/// Load the config and build the run context.
///
/// Runs before any network activity so configuration problems abort
/// the command up front.
pub(crate) fn load_context(config_path: Option<&PathBuf>) -> Result<ExportContext> {
    let path = resolve_config_path(config_path.map(PathBuf::as_path))?;
    debug!(path = %path.display(), "Loading config");
    let config = load_config(&path)?;
    ExportContext::from_config(&config)
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create tokio runtime: {e}")))
}

/// Print a stage result as its summary line or as one JSON object.
pub(crate) fn print_result<T: Display + Serialize>(result: &T, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
    } else {
        println!("{result}");
    }
    Ok(())
}
