//! # FieldDesk CLI (`fdesk`)
//!
//! The `fdesk` binary is the staff-side interface to the local store. It
//! provides commands for database initialization, one-off intakes, bulk
//! contact import, follow-up triage, and starting the HTTP API that the
//! public forms post to.
//!
//! ## Usage
//!
//! ```bash
//! fdesk --config ./config/fdesk.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fdesk init` | Create the SQLite database and run schema migrations |
//! | `fdesk intake` | Run one submission through validation and the pipeline |
//! | `fdesk import contacts <file>` | Bulk-import contacts from a JSON-lines file |
//! | `fdesk followups list` | Show the board (pending / completed) |
//! | `fdesk followups set-status <id> <status>` | Move a follow-up |
//! | `fdesk followups note <id> <text>` | Replace a follow-up's notes |
//! | `fdesk followups archive <id>` | Archive a follow-up |
//! | `fdesk followups purge` | Delete archived follow-ups |
//! | `fdesk serve api` | Start the JSON HTTP API |

mod board;
mod config;
mod db;
mod forms;
mod import;
mod intake;
mod migrate;
mod models;
mod server;
mod store;
mod sync;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::store::ContactStore;

/// FieldDesk CLI — a local-first constituent intake and follow-up tracker
/// for campaign field offices.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/fdesk.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "fdesk",
    about = "FieldDesk — a local-first constituent intake and follow-up tracker",
    version,
    long_about = "FieldDesk turns public intake forms (event requests, volunteer signups, live \
    field capture, business cards) into a per-office SQLite store of contacts, provenance \
    records, and staff follow-ups, with a JSON HTTP API for the forms and a best-effort push \
    of each follow-up to an optional remote endpoint."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/fdesk.toml`. Database path, server bind
    /// address, contact defaults, and sync settings are read from this file.
    #[arg(long, global = true, default_value = "./config/fdesk.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables (contacts,
    /// contact_origins, volunteer_profiles, volunteer_interests,
    /// event_leads, live_follow_ups). Idempotent — running it multiple
    /// times is safe.
    Init,

    /// Run one submission through form validation and the intake pipeline.
    ///
    /// Takes the same `data` payload the HTTP endpoint accepts. Prints the
    /// resulting contact, origin, and follow-up identifiers.
    Intake {
        /// Form module id: `event-request`, `team-signup`, `live-field`,
        /// or `business-card`.
        #[arg(long)]
        module: String,

        /// The form payload as inline JSON, `@path/to/file.json`, or `-`
        /// for stdin.
        #[arg(long)]
        data: String,

        /// Override the origin kind recorded for this intake (e.g.
        /// `manual-admin` when staff key in a paper form).
        #[arg(long)]
        origin: Option<String>,

        /// Free-text note stored on the origin row.
        #[arg(long)]
        note: Option<String>,
    },

    /// Bulk data imports.
    Import {
        #[command(subcommand)]
        action: ImportAction,
    },

    /// Staff follow-up board operations.
    Followups {
        #[command(subcommand)]
        action: FollowupsAction,
    },

    /// Start the JSON HTTP API.
    ///
    /// Serves the public submission endpoint and the follow-up board on
    /// the address configured in `[server].bind`.
    Serve {
        #[command(subcommand)]
        service: ServeService,
    },
}

/// Import subcommands.
#[derive(Subcommand)]
enum ImportAction {
    /// Import contacts from a JSON-lines file (one object per line).
    ///
    /// Each row becomes an intake with origin kind `csv-import` and no
    /// follow-up needed. Malformed lines are skipped and counted.
    Contacts {
        /// Path to the JSON-lines file.
        path: PathBuf,
    },
}

/// Follow-up board subcommands.
#[derive(Subcommand)]
enum FollowupsAction {
    /// List active follow-ups partitioned into pending and completed.
    List {
        /// Include archived follow-ups.
        #[arg(long)]
        all: bool,
    },
    /// Set a follow-up's status: `new`, `in-progress`, or `completed`.
    ///
    /// Moving to `completed` stamps the completion time; moving away
    /// clears it. No transition is blocked.
    SetStatus { id: String, status: String },
    /// Replace a follow-up's notes.
    Note { id: String, text: String },
    /// Archive a follow-up (hides it from the board; purge deletes it).
    Archive { id: String },
    /// Delete all archived follow-ups.
    Purge,
}

/// Server subcommands.
#[derive(Subcommand)]
enum ServeService {
    /// Start the JSON HTTP API server.
    Api,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Intake {
            module,
            data,
            origin,
            note,
        } => {
            let store = open_store(&cfg).await?;
            let channel = sync::channel_from_config(&cfg.sync)?;
            run_intake(&store, channel, &module, &data, origin, note).await?;
        }
        Commands::Import { action } => match action {
            ImportAction::Contacts { path } => {
                let store = open_store(&cfg).await?;
                let channel = sync::channel_from_config(&cfg.sync)?;
                import::run_import_contacts(&store, channel, &path).await?;
            }
        },
        Commands::Followups { action } => {
            let store = open_store(&cfg).await?;
            match action {
                FollowupsAction::List { all } => board::run_list(&store, all).await?,
                FollowupsAction::SetStatus { id, status } => {
                    board::run_set_status(&store, &id, &status).await?
                }
                FollowupsAction::Note { id, text } => board::run_note(&store, &id, &text).await?,
                FollowupsAction::Archive { id } => board::run_archive(&store, &id).await?,
                FollowupsAction::Purge => board::run_purge(&store).await?,
            }
        }
        Commands::Serve { service } => match service {
            ServeService::Api => {
                server::run_server(&cfg).await?;
            }
        },
    }

    Ok(())
}

async fn open_store(cfg: &config::Config) -> Result<ContactStore> {
    let pool = db::open(&cfg.db.path).await?;
    Ok(ContactStore::new(pool, cfg.defaults.state.clone()))
}

async fn run_intake(
    store: &ContactStore,
    channel: Arc<dyn sync::SyncChannel>,
    module: &str,
    data: &str,
    origin: Option<String>,
    note: Option<String>,
) -> Result<()> {
    let payload = read_payload(data)?;
    let request_id = Uuid::new_v4().to_string();

    let mut request = match forms::build_intake(module, &payload, &request_id) {
        Ok(request) => request,
        Err(forms::FormError::Invalid(details)) => {
            eprintln!("Error: validation failed");
            for detail in details {
                eprintln!("  {}", detail);
            }
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    if let Some(raw) = origin {
        request.origin_kind = match models::OriginKind::parse(&raw) {
            Some(kind) => kind,
            None => {
                eprintln!("Error: unknown origin kind '{}'", raw);
                std::process::exit(1);
            }
        };
    }
    if note.is_some() {
        request.origin_note = note;
    }

    let origin_kind = request.origin_kind;
    let outcome = intake::process_intake(store, channel, request).await?;

    println!("intake ok");
    println!(
        "  contact:   {} ({})",
        outcome.contact.id, outcome.contact.full_name
    );
    println!("  origin:    {} ({})", outcome.origin_id, origin_kind.as_str());
    println!("  follow-up: {}", outcome.follow_up_id);
    println!("  request:   {}", request_id);
    Ok(())
}

/// `--data` accepts inline JSON, `@file`, or `-` for stdin.
fn read_payload(data: &str) -> Result<serde_json::Value> {
    let raw = if data == "-" {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read payload from stdin")?;
        buf
    } else if let Some(path) = data.strip_prefix('@') {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload file: {}", path))?
    } else {
        data.to_string()
    };

    serde_json::from_str(&raw).context("Payload is not valid JSON")
}
