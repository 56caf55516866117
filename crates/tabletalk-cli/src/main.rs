//! `tabletalk` — chat with one tabular dataset.
//!
//! # Usage
//!
//! ```
//! tabletalk upload sales.csv
//! tabletalk chat
//! tabletalk history list
//! tabletalk history export <session-id> --out transcript.txt
//! ```
//!
//! Requires `ANTHROPIC_API_KEY` in the environment for `chat`.

mod commands;
mod table;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tabletalk", about = "Chat with one tabular dataset")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "tabletalk.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Load a CSV or Excel file as the active dataset, replacing any
  /// previous one.
  Upload {
    /// File to ingest (.csv, .xlsx, .xls).
    file: PathBuf,
  },

  /// Start an interactive chat session over the active dataset.
  Chat {
    /// Resume an existing session instead of starting a new one.
    #[arg(long, value_name = "SESSION_ID")]
    session: Option<Uuid>,
  },

  /// Inspect, delete, or export persisted chat sessions.
  History {
    #[command(subcommand)]
    command: HistoryCommand,
  },
}

#[derive(Subcommand)]
enum HistoryCommand {
  /// List known session ids, most recently active first.
  List,
  /// Print every exchange of one session.
  Show { session_id: Uuid },
  /// Delete one session's records.
  Delete { session_id: Uuid },
  /// Write one session as plain text.
  Export {
    session_id: Uuid,
    /// Output file; stdout when omitted.
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Settings layered from the TOML file and `TABLETALK_*` environment
/// variables. The API key is deliberately not part of this file; it comes
/// from `ANTHROPIC_API_KEY` only.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// SQLite database holding the dataset and the chat history.
  #[serde(default = "default_store_path")]
  pub store_path: String,

  /// Model override; the client default is used when unset.
  #[serde(default)]
  pub model: Option<String>,
}

fn default_store_path() -> String { "tabletalk.db".to_owned() }

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TABLETALK"))
    .build()
    .context("failed to read config file")?;

  let app_config: AppConfig = settings
    .try_deserialize()
    .context("failed to deserialise AppConfig")?;

  match cli.command {
    Command::Upload { file } => commands::upload(&app_config, &file).await,
    Command::Chat { session } => commands::chat(&app_config, session).await,
    Command::History { command } => match command {
      HistoryCommand::List => commands::history_list(&app_config).await,
      HistoryCommand::Show { session_id } => {
        commands::history_show(&app_config, session_id).await
      }
      HistoryCommand::Delete { session_id } => {
        commands::history_delete(&app_config, session_id).await
      }
      HistoryCommand::Export { session_id, out } => {
        commands::history_export(&app_config, session_id, out.as_deref()).await
      }
    },
  }
}
