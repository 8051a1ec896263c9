//! Per-run tallies and operator-facing summaries.
//!
//! Failed tasks arrive as `None` and are kept out of every count; they
//! are only reported separately so the operator knows to re-run.

use std::fmt;

use serde::Serialize;

use crate::export::layout::{COMMENTS_FILE, REPLIES_FILE};

/// Classification of one ticket's artifact in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Fetched and written.
    Written,
    /// Already on disk and not forced.
    Skipped,
    /// Ticket's last activity predates the cutoff; nothing attempted.
    Stale,
}

/// Which child artifact a summary is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Replies,
    Comments,
}

impl ArtifactKind {
    /// File the artifact is stored in, next to the ticket anchor.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Replies => REPLIES_FILE,
            Self::Comments => COMMENTS_FILE,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replies => write!(f, "replies"),
            Self::Comments => write!(f, "comments"),
        }
    }
}

/// Aggregate counts for a replies or comments run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub kind: ArtifactKind,
    pub written: usize,
    pub skipped: usize,
    pub stale: usize,
    /// Tasks that produced no classification.
    pub failed: usize,
}

impl Summary {
    #[must_use]
    pub fn from_outcomes(kind: ArtifactKind, outcomes: &[Option<Outcome>]) -> Self {
        let count = |wanted: Outcome| {
            outcomes
                .iter()
                .filter(|o| **o == Some(wanted))
                .count()
        };

        Self {
            kind,
            written: count(Outcome::Written),
            skipped: count(Outcome::Skipped),
            stale: count(Outcome::Stale),
            failed: outcomes.iter().filter(|o| o.is_none()).count(),
        }
    }

    /// Tickets whose artifact was checked: written plus skipped.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.written + self.skipped
    }

    /// Tickets that produced a classification.
    #[must_use]
    pub fn total(&self) -> usize {
        self.processed() + self.stale
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} out of {} checked {} from {} processed tickets",
            self.written,
            self.processed(),
            self.kind,
            self.total()
        )?;
        if self.failed > 0 {
            write!(f, " ({} failed)", self.failed)?;
        }
        Ok(())
    }
}

/// Attachment counters for one ticket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttachmentTally {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    /// The ticket was filtered out by the cutoff.
    pub stale: bool,
}

impl AttachmentTally {
    #[must_use]
    pub fn stale() -> Self {
        Self {
            stale: true,
            ..Self::default()
        }
    }

    pub fn add_downloaded(&mut self) {
        self.downloaded += 1;
    }

    pub fn add_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn add_failed(&mut self) {
        self.failed += 1;
    }
}

/// Aggregate counts for an attachments run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AttachmentSummary {
    /// Attachments fetched and written.
    pub written: usize,
    pub skipped: usize,
    /// Individual attachments whose download or write failed.
    pub failed: usize,
    /// Tickets filtered out by the cutoff.
    pub stale_tickets: usize,
    /// Tickets whose task failed as a whole (e.g. unreadable anchor).
    pub failed_tickets: usize,
}

impl AttachmentSummary {
    #[must_use]
    pub fn from_tallies(tallies: &[Option<AttachmentTally>]) -> Self {
        tallies.iter().fold(Self::default(), |mut acc, tally| {
            match tally {
                Some(t) => {
                    acc.written += t.downloaded;
                    acc.skipped += t.skipped;
                    acc.failed += t.failed;
                    acc.stale_tickets += usize::from(t.stale);
                }
                None => acc.failed_tickets += 1,
            }
            acc
        })
    }
}

impl fmt::Display for AttachmentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attachments written and {} skipped",
            self.written, self.skipped
        )?;
        if self.failed > 0 || self.failed_tickets > 0 {
            write!(
                f,
                " ({} attachments and {} tickets failed)",
                self.failed, self.failed_tickets
            )?;
        }
        Ok(())
    }
}

/// Counts for a ticket listing run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TicketSummary {
    pub pages: u32,
    pub total_pages: u32,
    pub written: usize,
    pub failed_pages: usize,
    pub failed_tickets: usize,
}

impl fmt::Display for TicketSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} tickets from {} of {} pages",
            self.written, self.pages, self.total_pages
        )?;
        if self.failed_pages > 0 || self.failed_tickets > 0 {
            write!(
                f,
                " ({} pages and {} tickets failed)",
                self.failed_pages, self.failed_tickets
            )?;
        }
        Ok(())
    }
}
