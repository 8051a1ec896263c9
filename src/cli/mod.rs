//! CLI definitions using clap.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

pub mod commands;

/// Export a helpdesk account to a local directory tree.
#[derive(Parser, Debug)]
#[command(name = "hdx", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ./hdx.json, then the user config dir)
    #[arg(short, long, global = true, env = "HDX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log verbosity (RUST_LOG overrides)
    #[arg(short, long, value_enum, global = true, default_value_t)]
    pub log_level: LogLevel,

    /// Print summaries and errors as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Log verbosity levels.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    #[must_use]
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the users
    Users,

    /// Export the labels
    Labels,

    /// Export the teams
    Teams,

    /// Export the snippets
    Snippets,

    /// Export the forwarding addresses
    Emails,

    /// Export all tickets into the sharded folder structure
    ExportTickets(SinceArgs),

    /// Export replies for the tickets stored on disk
    ExportReplies(ChildArgs),

    /// Export comments for the tickets stored on disk
    ExportComments(ChildArgs),

    /// Export attachments for the tickets stored on disk
    ExportAttachments(ChildArgs),

    /// Export all account metadata
    AllMetadata,

    /// Export tickets, replies, comments and attachments
    AllTickets(SinceArgs),

    /// Export metadata and all ticket data
    All(SinceArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

/// Cutoff shared by the ticket commands.
#[derive(Args, Debug, Clone, Copy)]
pub struct SinceArgs {
    /// Only export data with activity after this ISO 8601 date or time,
    /// e.g. 2017-11-28 or 2017-11-28T09:30:00Z
    #[arg(short, long, value_parser = parse_since_date)]
    pub since_date: Option<DateTime<Utc>>,
}

/// Options for the per-ticket child exports.
#[derive(Args, Debug, Clone, Copy)]
pub struct ChildArgs {
    #[command(flatten)]
    pub since: SinceArgs,

    /// Don't skip files that were already downloaded
    #[arg(short, long)]
    pub force: bool,
}

/// Parse a `--since-date` value.
///
/// Accepts a full RFC 3339 timestamp, a date-time without offset, or a
/// bare date. Values without an offset are taken as UTC.
///
/// # Errors
///
/// Returns a message suitable for clap when nothing matches.
pub fn parse_since_date(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(format!(
        "'{value}' is not a valid ISO 8601 date, use e.g. 2019-11-28 or 2019-11-28T10:00:00Z"
    ))
}
