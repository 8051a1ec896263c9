//! Incremental "since date" filter.
//!
//! Decides whether a ticket's replies, comments and attachments are still
//! worth fetching. The ticket listing itself is never filtered here.

use chrono::{DateTime, Utc};

use crate::model::TicketAnchor;

/// Cutoff used when the caller gives none: every ticket is eligible.
pub const EARLIEST_CUTOFF: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;

/// Whether the ticket had activity strictly after `cutoff`.
///
/// Anchors without a recorded last activity are always eligible.
#[must_use]
pub fn is_eligible(anchor: &TicketAnchor, cutoff: DateTime<Utc>) -> bool {
    anchor
        .last_activity_at
        .is_none_or(|last_activity| last_activity > cutoff)
}
