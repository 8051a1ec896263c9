//! Data models for exported helpdesk entities.
//!
//! The exporter stores remote documents verbatim; these types are the
//! validated views the pipeline reads back out of them:
//! - TicketAnchor (`ticket.json`)
//! - Reply (entries of `replies.json`)
//! - Attachment

pub mod ticket;

pub use ticket::{Attachment, AttachmentUrl, Content, Reply, TicketAnchor};
