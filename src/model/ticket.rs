//! Ticket anchor and reply schemas.
//!
//! Only the fields the pipeline reads are modelled. Everything else in
//! the remote payload is carried through untouched because the files on
//! disk are the raw documents, not re-serialized structs.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{Error, Result};

/// The persisted `ticket.json` for one remote ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketAnchor {
    /// Remote ticket id, stable for the ticket's lifetime.
    pub id: u64,

    pub created_at: DateTime<Utc>,

    /// Last activity as of the listing that wrote this anchor.
    /// `None` means the ticket is treated as active now.
    #[serde(default)]
    pub last_activity_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub content: Content,
}

/// The `content` object shared by tickets and replies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// One downloadable attachment.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub url: AttachmentUrl,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentUrl {
    /// Download locator for the original file (needs the auth token).
    pub original: String,
}

/// One entry of `replies.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Reply {
    #[serde(default)]
    pub content: Option<Content>,
}

impl Reply {
    /// Attachments on this reply; replies without content have none.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        self.content
            .as_ref()
            .map_or(&[], |c| c.attachments.as_slice())
    }
}

impl TicketAnchor {
    /// Validate a ticket document as returned by the listing endpoint.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if required fields are missing or mistyped.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        Ok(Self::deserialize(value)?)
    }

    /// Load and validate a persisted anchor.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and
    /// `Error::InvalidTicket` if it does not have the expected shape.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| Error::InvalidTicket {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Load the replies stored next to an anchor.
///
/// # Errors
///
/// Returns `Error::InvalidTicket` if the file is not a list of replies.
pub fn load_replies(path: &Path) -> Result<Vec<Reply>> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| Error::InvalidTicket {
        path: path.to_path_buf(),
        message: format!("malformed replies: {e}"),
    })
}
