//! LedgerDesk CLI
//!
//! Checks, lists, posts and reports on journal entries held by the
//! configured backend.
//!
//! # Commands
//!
//! - `ledgerdesk check <file>` - Validate an entry stored as JSON
//! - `ledgerdesk list` - List active entries
//! - `ledgerdesk post <id>` - Post a draft
//! - `ledgerdesk force-draft <id> --actor <name> [--reason <text>]` - Reopen a posted entry
//! - `ledgerdesk ledger <account-id>` - General ledger of one account
//! - `ledgerdesk trial-balance` - Trial balance over posted entries

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ledgerdesk_core::journal::EntryStatus;
use ledgerdesk_shared::AppConfig;
use ledgerdesk_shared::config::LoggingConfig;
use ledgerdesk_shared::types::{AccountId, JournalEntryId};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// LedgerDesk journal entry tooling
#[derive(Parser, Debug)]
#[command(name = "ledgerdesk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a journal entry stored as JSON
    Check {
        /// File holding the entry in request format
        file: PathBuf,
    },

    /// List active journal entries
    List {
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Entries per page
        #[arg(long, default_value = "20")]
        per_page: u32,

        /// Only entries with this status (draft or posted)
        #[arg(short, long, value_parser = parse_status)]
        status: Option<EntryStatus>,

        /// Match on reference or description
        #[arg(long)]
        search: Option<String>,
    },

    /// Post a draft entry after checking its balance locally
    Post {
        /// Entry id
        id: JournalEntryId,

        /// Name recorded as the poster
        #[arg(long, default_value = "cli")]
        actor: String,
    },

    /// Return a posted entry to draft (audited override)
    ForceDraft {
        /// Entry id
        id: JournalEntryId,

        /// Name recorded in the audit log
        #[arg(long)]
        actor: String,

        /// Why the posted entry is being reopened
        #[arg(long, default_value = "")]
        reason: String,
    },

    /// Print the general ledger of one account
    Ledger {
        /// Account id
        account_id: AccountId,

        /// First date included (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last date included (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Print the trial balance over posted entries
    TrialBalance {
        /// Last date included (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
}

fn parse_status(value: &str) -> Result<EntryStatus, String> {
    EntryStatus::parse(value).ok_or_else(|| format!("unknown status '{value}'"))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // `check` works without a backend, so a missing config only matters later.
    let config = AppConfig::load();
    let logging = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    init_tracing(&logging);
    debug!(command = ?cli.command, "Starting ledgerdesk");

    match cli.command {
        Command::Check { file } => commands::check(&file),
        command => {
            let config = config.context("Failed to load configuration")?;
            commands::Backend::connect(&config)?.run(command).await
        }
    }
}

/// Logs go to stderr so command output stays pipeable.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
