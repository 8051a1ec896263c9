//! Ticket listing stage.
//!
//! Pulls every page of the ticket listing and writes each ticket's raw
//! document to its anchor file. The cutoff is forwarded to the server as
//! a query parameter; nothing is filtered locally. Pages are fetched one
//! after another because the page count is only known once the first
//! page arrives.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::client::Page;
use crate::error::Result;
use crate::export::ExportContext;
use crate::export::layout::{TICKET_FILE, locate};
use crate::export::report::TicketSummary;
use crate::export::writer::write_json;
use crate::model::TicketAnchor;

/// Write one ticket document to `<root>/tickets/<shard>/<id>/ticket.json`.
///
/// Returns the ticket id.
///
/// # Errors
///
/// Returns an error if the document has no valid id or timestamps, or if
/// the write fails.
pub fn save_ticket(root: &Path, ticket: &Value) -> Result<u64> {
    let anchor = TicketAnchor::from_value(ticket)?;
    let dir = locate(root, anchor.id)?;
    write_json(&dir.join(TICKET_FILE), ticket)?;
    Ok(anchor.id)
}

fn save_page(root: &Path, page: &Page<Value>, summary: &mut TicketSummary) {
    info!(
        page = page.page,
        total_pages = page.total_pages,
        tickets = page.items.len(),
        "Saving ticket page"
    );
    for ticket in &page.items {
        match save_ticket(root, ticket) {
            Ok(_) => summary.written += 1,
            Err(e) => {
                let id = ticket.get("id").unwrap_or(&Value::Null);
                error!(page = page.page, ticket = %id, error = %e, "Failed to save ticket");
                summary.failed_tickets += 1;
            }
        }
    }
}

/// Export every ticket page into the tree.
///
/// A failure on the first page is returned, since without it the page
/// count is unknown. A failure on a later page is logged and the next
/// page is requested.
///
/// # Errors
///
/// Returns an error if the export root cannot be created or the first
/// page cannot be fetched.
pub async fn export_tickets(
    ctx: &ExportContext,
    since: Option<DateTime<Utc>>,
) -> Result<TicketSummary> {
    fs::create_dir_all(&ctx.root)?;

    let first = ctx.client.tickets_page(1, since).await?;
    let mut summary = TicketSummary {
        total_pages: first.total_pages,
        ..TicketSummary::default()
    };
    info!(
        total_pages = first.total_pages,
        per_page = ctx.client.per_page(),
        "Ticket pages to download"
    );

    let mut requested = 1;
    let mut next = Some(first);
    loop {
        if let Some(page) = next.take() {
            summary.pages += 1;
            summary.total_pages = page.total_pages;
            save_page(&ctx.root, &page, &mut summary);
            if page.is_last() {
                break;
            }
        }

        requested += 1;
        if requested > summary.total_pages {
            break;
        }

        match ctx.client.tickets_page(requested, since).await {
            Ok(page) => next = Some(page),
            Err(e) => {
                warn!(page = requested, error = %e, "Failed to fetch ticket page");
                summary.failed_pages += 1;
            }
        }
    }

    Ok(summary)
}
