//! hdx CLI entry point.

use clap::Parser;
use colored::Colorize;
use hdx::cli::commands;
use hdx::cli::{Cli, Commands, LogLevel};
use hdx::error::Error;
use hdx::export::{ArtifactKind, MetadataKind};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    init_tracing(cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else if let Some(hint) = e.hint() {
                eprintln!("{} {e}\n  Hint: {hint}", "Error:".red().bold());
            } else {
                eprintln!("{} {e}", "Error:".red().bold());
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    // Honor RUST_LOG if set, otherwise use the --log-level flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(format!(
            "{},hyper=warn,reqwest=warn",
            level.as_filter()
        ))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let config = cli.config.as_ref();
    let json = cli.json;

    match &cli.command {
        Commands::Version => commands::version::execute(config, json),
        Commands::Completions { shell } => commands::completions::execute(*shell),

        // Metadata
        Commands::Users => commands::metadata::execute(MetadataKind::Users, config, json),
        Commands::Labels => commands::metadata::execute(MetadataKind::Labels, config, json),
        Commands::Teams => commands::metadata::execute(MetadataKind::Teams, config, json),
        Commands::Snippets => commands::metadata::execute(MetadataKind::Snippets, config, json),
        Commands::Emails => commands::metadata::execute(MetadataKind::Emails, config, json),

        // Ticket stages
        Commands::ExportTickets(args) => {
            commands::tickets::execute_tickets(args.since_date, config, json)
        }
        Commands::ExportReplies(args) => {
            commands::tickets::execute_children(ArtifactKind::Replies, *args, config, json)
        }
        Commands::ExportComments(args) => {
            commands::tickets::execute_children(ArtifactKind::Comments, *args, config, json)
        }
        Commands::ExportAttachments(args) => {
            commands::tickets::execute_attachments(*args, config, json)
        }

        // Composites
        Commands::AllMetadata => commands::all::execute_metadata(config, json),
        Commands::AllTickets(args) => commands::all::execute_tickets(args.since_date, config, json),
        Commands::All(args) => commands::all::execute_all(args.since_date, config, json),
    }
}
