//! `hdx version`: build info plus the config file a run would use.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::resolve_config_path;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct VersionOutput {
    version: &'static str,
    build: &'static str,
    /// Config file the export commands would load, if any.
    config: Option<PathBuf>,
}

impl VersionOutput {
    fn collect(config_path: Option<&Path>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            build: if cfg!(debug_assertions) {
                "dev"
            } else {
                "release"
            },
            config: resolve_config_path(config_path).ok(),
        }
    }
}

/// Execute the version command.
///
/// A missing config is reported, not treated as an error.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(config_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let output = VersionOutput::collect(config_path.map(PathBuf::as_path));

    if json {
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("hdx {} ({})", output.version, output.build);
    match &output.config {
        Some(path) => println!("config: {}", path.display()),
        None => println!("config: not found"),
    }
    Ok(())
}
