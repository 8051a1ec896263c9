//! Account metadata dumps.
//!
//! Each kind is one API call written to `<root>/<kind>.json`. There is
//! nothing to salvage from a partial result, so any failure is returned
//! to the caller.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::export::ExportContext;
use crate::export::writer::write_json;

/// Account-level collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKind {
    Users,
    Labels,
    Teams,
    Snippets,
    /// Forwarding addresses.
    Emails,
}

impl MetadataKind {
    /// Order used by `all-metadata`.
    pub const ALL: [Self; 5] = [
        Self::Labels,
        Self::Snippets,
        Self::Teams,
        Self::Users,
        Self::Emails,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Labels => "labels",
            Self::Teams => "teams",
            Self::Snippets => "snippets",
            Self::Emails => "emails",
        }
    }

    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one metadata dump.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataExport {
    pub kind: MetadataKind,
    pub count: usize,
    pub path: PathBuf,
}

impl fmt::Display for MetadataExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} exported to {}",
            self.count,
            self.kind,
            self.path.display()
        )
    }
}

/// Fetch one metadata collection and write it under the export root.
///
/// # Errors
///
/// Returns an error if the call fails or the file cannot be written.
pub async fn export_metadata(ctx: &ExportContext, kind: MetadataKind) -> Result<MetadataExport> {
    let items = match kind {
        MetadataKind::Users => ctx.client.users().await?,
        MetadataKind::Labels => ctx.client.labels().await?,
        MetadataKind::Teams => ctx.client.teams().await?,
        MetadataKind::Snippets => ctx.client.snippets().await?,
        MetadataKind::Emails => ctx.client.emails().await?,
    };

    fs::create_dir_all(&ctx.root)?;
    let path = ctx.root.join(kind.file_name());
    write_json(&path, &items)?;
    info!(%kind, count = items.len(), path = %path.display(), "Metadata exported");

    Ok(MetadataExport {
        kind,
        count: items.len(),
        path,
    })
}
