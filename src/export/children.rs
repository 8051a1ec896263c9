//! Per-ticket child stages: replies, comments and attachments.
//!
//! Each stage scans the tree for ticket anchors, then runs one task per
//! anchor on the bounded pool. A task reads its anchor, applies the
//! cutoff, applies the skip-if-exists rule, and only then touches the
//! network. Each stage is classified on its own, so a ticket whose
//! replies failed still gets its comments and attachments.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::error::Result;
use crate::export::dispatch;
use crate::export::filter::is_eligible;
use crate::export::layout::{
    ATTACHMENTS_DIR, AnchorPath, REPLIES_FILE, REPLY_ATTACHMENTS_DIR, discover_anchors,
};
use crate::export::report::{
    ArtifactKind, AttachmentSummary, AttachmentTally, Outcome, Summary,
};
use crate::export::writer::{atomic_write, attachment_file_names, should_fetch, write_json};
use crate::export::{ExportContext, RunOptions};
use crate::model::ticket::load_replies;
use crate::model::{Attachment, Reply, TicketAnchor};

/// Fetch replies or comments for one ticket.
async fn save_child(
    ctx: &ExportContext,
    anchor: &AnchorPath,
    kind: ArtifactKind,
    options: RunOptions,
) -> Result<Outcome> {
    let ticket = TicketAnchor::load(anchor.file())?;

    if !is_eligible(&ticket, options.cutoff()) {
        debug!(ticket = ticket.id, %kind, "Ticket is stale");
        return Ok(Outcome::Stale);
    }

    let target = anchor.sibling(kind.file_name());
    if !should_fetch(&target, options.force) {
        debug!(ticket = ticket.id, %kind, "Skipping, already exported");
        return Ok(Outcome::Skipped);
    }

    debug!(ticket = ticket.id, %kind, "Saving");
    let items = match kind {
        ArtifactKind::Replies => ctx.client.replies(ticket.id).await?,
        ArtifactKind::Comments => ctx.client.comments(ticket.id).await?,
    };
    write_json(&target, &items)?;

    Ok(Outcome::Written)
}

/// Export replies or comments for every ticket on disk.
///
/// # Errors
///
/// Returns an error only if the ticket tree cannot be scanned; per-ticket
/// failures are logged and counted as failed.
pub async fn export_children(
    ctx: Arc<ExportContext>,
    kind: ArtifactKind,
    options: RunOptions,
) -> Result<Summary> {
    let anchors = discover_anchors(&ctx.root)?;
    info!(%kind, tickets = anchors.len(), workers = ctx.workers, "Starting parallel download");

    let workers = ctx.workers;
    let outcomes = dispatch::run(anchors, workers, move |anchor| {
        let ctx = Arc::clone(&ctx);
        async move { save_child(&ctx, &anchor, kind, options).await }
    })
    .await;

    Ok(Summary::from_outcomes(kind, &outcomes))
}

/// Download a list of attachments into `dir`, one at a time.
///
/// Each attachment is independent: a failed download is logged and
/// tallied without stopping the rest.
async fn download_all(
    ctx: &ExportContext,
    ticket_id: u64,
    attachments: &[&Attachment],
    dir: &Path,
    force: bool,
    tally: &mut AttachmentTally,
) {
    if attachments.is_empty() {
        return;
    }
    debug!(ticket = ticket_id, count = attachments.len(), dir = %dir.display(), "Attachments to download");

    let names = attachment_file_names(attachments.iter().map(|a| a.filename.as_str()));
    for (attachment, name) in attachments.iter().zip(names) {
        let target = dir.join(&name);
        if !should_fetch(&target, force) {
            debug!(ticket = ticket_id, file = %target.display(), "Skipping attachment");
            tally.add_skipped();
            continue;
        }

        let url = &attachment.url.original;
        let result = match ctx.client.download(url).await {
            Ok(body) => atomic_write(&target, &body),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => tally.add_downloaded(),
            Err(e) => {
                error!(ticket = ticket_id, url = %url, error = %e, "Failed to download attachment");
                tally.add_failed();
            }
        }
    }
}

/// Fetch ticket and reply attachments for one ticket.
async fn save_attachments(
    ctx: &ExportContext,
    anchor: &AnchorPath,
    options: RunOptions,
) -> Result<AttachmentTally> {
    let ticket = TicketAnchor::load(anchor.file())?;

    if !is_eligible(&ticket, options.cutoff()) {
        debug!(ticket = ticket.id, "Ticket is stale, skipping attachments");
        return Ok(AttachmentTally::stale());
    }

    let mut tally = AttachmentTally::default();

    let own: Vec<&Attachment> = ticket.content.attachments.iter().collect();
    download_all(
        ctx,
        ticket.id,
        &own,
        &anchor.sibling(ATTACHMENTS_DIR),
        options.force,
        &mut tally,
    )
    .await;

    // Reply attachments are only known once replies have been exported.
    let replies_file = anchor.sibling(REPLIES_FILE);
    if replies_file.exists() {
        match load_replies(&replies_file) {
            Ok(replies) => {
                let nested: Vec<&Attachment> =
                    replies.iter().flat_map(Reply::attachments).collect();
                download_all(
                    ctx,
                    ticket.id,
                    &nested,
                    &anchor.sibling(REPLY_ATTACHMENTS_DIR),
                    options.force,
                    &mut tally,
                )
                .await;
            }
            Err(e) => {
                error!(ticket = ticket.id, error = %e, "Cannot read replies for attachments");
                tally.add_failed();
            }
        }
    }

    Ok(tally)
}

/// Export attachments for every ticket on disk.
///
/// # Errors
///
/// Returns an error only if the ticket tree cannot be scanned.
pub async fn export_attachments(
    ctx: Arc<ExportContext>,
    options: RunOptions,
) -> Result<AttachmentSummary> {
    let anchors = discover_anchors(&ctx.root)?;
    info!(tickets = anchors.len(), workers = ctx.workers, "Starting attachment download");

    let workers = ctx.workers;
    let tallies = dispatch::run(anchors, workers, move |anchor| {
        let ctx = Arc::clone(&ctx);
        async move { save_attachments(&ctx, &anchor, options).await }
    })
    .await;

    Ok(AttachmentSummary::from_tallies(&tallies))
}
