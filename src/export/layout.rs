//! On-disk layout of the export tree.
//!
//! Tickets live at `tickets/<shard>/<id>/` where the shard is `id % 99`
//! zero-padded to two digits. The mapping is a pure function of the id,
//! so every run (and every worker) agrees on where a ticket lives without
//! any coordination.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::Result;

/// Number of shard directories under `tickets/`.
pub const SHARD_COUNT: u64 = 99;

pub const TICKETS_DIR: &str = "tickets";
pub const TICKET_FILE: &str = "ticket.json";
pub const REPLIES_FILE: &str = "replies.json";
pub const COMMENTS_FILE: &str = "comments.json";
pub const ATTACHMENTS_DIR: &str = "attachments";
pub const REPLY_ATTACHMENTS_DIR: &str = "attachments_replies";

/// Two-digit shard name for a ticket id.
#[must_use]
pub fn shard(id: u64) -> String {
    format!("{:02}", id % SHARD_COUNT)
}

/// Directory of a ticket, without touching the filesystem.
#[must_use]
pub fn ticket_dir(base_dir: &Path, id: u64) -> PathBuf {
    base_dir
        .join(TICKETS_DIR)
        .join(shard(id))
        .join(id.to_string())
}

/// Directory of a ticket, created if absent.
///
/// Safe to call repeatedly: an existing directory is not an error.
///
/// # Errors
///
/// Returns an error if the directory cannot be created for any reason
/// other than already existing (e.g. permission denied).
pub fn locate(base_dir: &Path, id: u64) -> Result<PathBuf> {
    let dir = ticket_dir(base_dir, id);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// A discovered `ticket.json` on disk: one unit of work for the child
/// stages.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AnchorPath(PathBuf);

impl AnchorPath {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    /// Path of the `ticket.json` file.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.0
    }

    /// The ticket directory holding the anchor and its children.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.0.parent().unwrap_or_else(|| Path::new("."))
    }

    #[must_use]
    pub fn sibling(&self, name: &str) -> PathBuf {
        self.dir().join(name)
    }
}

impl fmt::Display for AnchorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Find every ticket anchor under `base_dir/tickets`.
///
/// Only files named exactly `ticket.json` count, so `replies.json`,
/// `comments.json` and leftover temp files are never mistaken for
/// tickets. The result is sorted so dispatch order is reproducible.
///
/// A shard or ticket directory that cannot be read is logged and left
/// out, so the rest of the tree still gets processed.
///
/// # Errors
///
/// Returns an error if the `tickets` directory itself cannot be read.
pub fn discover_anchors(base_dir: &Path) -> Result<Vec<AnchorPath>> {
    let root = base_dir.join(TICKETS_DIR);
    if !root.is_dir() {
        debug!(root = %root.display(), "No tickets directory yet");
        return Ok(Vec::new());
    }

    let mut anchors = Vec::new();
    for entry in WalkDir::new(&root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(std::io::Error::from(e).into()),
            Err(e) => {
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                warn!(path, error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && entry.file_name() == TICKET_FILE {
            anchors.push(AnchorPath::new(entry.into_path()));
        }
    }

    anchors.sort();
    debug!(count = anchors.len(), "Discovered ticket anchors");
    Ok(anchors)
}
