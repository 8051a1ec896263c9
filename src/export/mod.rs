//! The export pipeline.
//!
//! Stages, in the order a full run executes them:
//!
//! 1. **Metadata** ([`metadata`]): single-call dumps of users, labels,
//!    teams, snippets and forwarding addresses.
//! 2. **Tickets** ([`tickets`]): page through the listing and write one
//!    `ticket.json` anchor per ticket into its shard directory.
//! 3. **Children** ([`children`]): re-scan the tree for anchors and fetch
//!    replies, comments and attachments per ticket on a bounded pool.
//!
//! # Incremental and idempotent re-runs
//!
//! The tree on disk is the only state. A child artifact is fetched when
//! its ticket saw activity after the cutoff ([`filter`]) and the artifact
//! is missing or `force` is set ([`writer`]). Everything else is counted
//! as stale or skipped ([`report`]). Failures are logged per ticket and
//! left for the next run to pick up.
//!
//! # Layout
//!
//! ```text
//! <root>/users.json, labels.json, teams.json, snippets.json, emails.json
//! <root>/tickets/<id % 99, 2 digits>/<id>/ticket.json
//!                                        /replies.json
//!                                        /comments.json
//!                                        /attachments/<file>
//!                                        /attachments_replies/<file>
//! ```

pub mod children;
pub mod dispatch;
pub mod filter;
pub mod layout;
pub mod metadata;
pub mod report;
pub mod tickets;
pub mod writer;

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::client::ApiClient;
use crate::config::Config;
use crate::error::Result;

pub use children::{export_attachments, export_children};
pub use metadata::{export_metadata, MetadataExport, MetadataKind};
pub use report::{ArtifactKind, AttachmentSummary, Outcome, Summary, TicketSummary};
pub use tickets::export_tickets;

/// Everything a run needs, built once and shared read-only with every
/// task.
#[derive(Debug, Clone)]
pub struct ExportContext {
    pub client: ApiClient,
    /// Root of the export tree.
    pub root: PathBuf,
    /// Worker pool size for the per-ticket stages.
    pub workers: usize,
}

impl ExportContext {
    #[must_use]
    pub fn new(client: ApiClient, root: PathBuf, workers: usize) -> Self {
        Self {
            client,
            root,
            workers,
        }
    }

    /// Build the context for the account described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            ApiClient::new(config)?,
            config.export_folder.clone(),
            config.download_threads,
        ))
    }
}

/// Per-invocation switches for the child stages.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Only tickets with activity after this instant get their children
    /// fetched. `None` admits every ticket.
    pub since: Option<DateTime<Utc>>,
    /// Re-fetch and overwrite artifacts that already exist.
    pub force: bool,
}

impl RunOptions {
    #[must_use]
    pub fn new(since: Option<DateTime<Utc>>, force: bool) -> Self {
        Self { since, force }
    }

    /// The effective cutoff for [`filter::is_eligible`].
    #[must_use]
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.since.unwrap_or(filter::EARLIEST_CUTOFF)
    }
}
