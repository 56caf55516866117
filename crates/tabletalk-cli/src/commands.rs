//! Subcommand implementations.

use std::{
  io::Write as _,
  path::Path,
  sync::Arc,
};

use anyhow::Context as _;
use tabletalk_core::{
  llm::LanguageModel,
  session::{SessionContext, Turn},
  store::{HistoryStore, TabularStore},
};
use tabletalk_engine::{
  SessionController, TurnOutcome,
  session::{EXECUTION_FAILED_MESSAGE, NO_RESULTS_MESSAGE},
};
use tabletalk_llm::{AnthropicClient, LlmConfig};
use tabletalk_store_sqlite::{SqliteHistoryStore, SqliteTabularStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use crate::{AppConfig, table};

// ─── Upload ──────────────────────────────────────────────────────────────────

pub async fn upload(config: &AppConfig, file: &Path) -> anyhow::Result<()> {
  let dataset = tabletalk_ingest::read_file(file)
    .with_context(|| format!("reading {}", file.display()))?;

  let rows = dataset.row_count();
  let columns = dataset.columns.len();

  let store = SqliteTabularStore::open(&config.store_path)
    .await
    .with_context(|| format!("opening store at {}", config.store_path))?;
  store
    .replace_dataset(dataset)
    .await
    .context("loading dataset into store")?;

  println!("Loaded {rows} rows, {columns} columns into '{}'.", config.store_path);
  Ok(())
}

// ─── Chat ────────────────────────────────────────────────────────────────────

pub async fn chat(config: &AppConfig, session: Option<Uuid>) -> anyhow::Result<()> {
  let tabular = Arc::new(
    SqliteTabularStore::open(&config.store_path)
      .await
      .with_context(|| format!("opening store at {}", config.store_path))?,
  );
  let history = Arc::new(
    SqliteHistoryStore::open(&config.store_path)
      .await
      .context("opening history store")?,
  );

  let mut llm_config = LlmConfig::from_env().context(
    "missing credentials; set ANTHROPIC_API_KEY in the environment",
  )?;
  if let Some(model) = &config.model {
    llm_config = llm_config.with_model(model);
  }
  let client = AnthropicClient::new(llm_config)?;

  // Gate the session on a trivial round trip so a bad key fails here
  // instead of on the first question.
  client.validate().await.context("credential check failed")?;

  let mut controller =
    SessionController::new(tabular, history, Arc::new(client));
  if let Some(session_id) = session {
    controller = controller.resume(session_id);
    let replayed = controller.restore().await?;
    println!("Resumed session {session_id} ({replayed} earlier exchanges).");
    print_transcript(controller.session());
  } else {
    println!("Session {}.", controller.session().session_id());
  }
  println!("Ask a question, or /clear to reset the transcript, /quit to exit.");

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  loop {
    print!("you> ");
    std::io::stdout().flush()?;

    let Some(line) = lines.next_line().await? else {
      break;
    };
    let question = line.trim();

    match question {
      "" => continue,
      "/quit" => break,
      "/clear" => {
        controller.clear();
        println!("Transcript cleared.");
        continue;
      }
      _ => {}
    }

    let mut streamed = false;
    let outcome = match controller
      .handle_turn(question, |chunk| {
        streamed = true;
        print!("{chunk}");
        std::io::stdout().flush().ok();
      })
      .await
    {
      Ok(outcome) => outcome,
      // Turn-aborting errors (no dataset, backend down) leave the
      // session usable; report and keep reading.
      Err(e) => {
        eprintln!("error: {e}");
        continue;
      }
    };

    match outcome {
      TurnOutcome::Answered { narration, result } => {
        if streamed {
          println!();
        } else {
          println!("{narration}");
        }
        println!("{}", table::render(&result));
      }
      TurnOutcome::ExecutionFailed(_) => println!("{EXECUTION_FAILED_MESSAGE}"),
      TurnOutcome::EmptyResult => println!("{NO_RESULTS_MESSAGE}"),
    }
  }

  Ok(())
}

fn print_transcript(session: &SessionContext) {
  for turn in session.transcript() {
    match turn {
      Turn::User(text) => println!("you> {text}"),
      Turn::Assistant(text) => println!("{text}"),
      Turn::ResultTable(result) => println!("{}", table::render(result)),
    }
  }
}

// ─── History ─────────────────────────────────────────────────────────────────

pub async fn history_list(config: &AppConfig) -> anyhow::Result<()> {
  let store = open_history(config).await?;
  let ids = store.session_ids().await?;
  if ids.is_empty() {
    println!("No sessions recorded.");
    return Ok(());
  }
  for id in ids {
    let count = store.load_session(id).await?.len();
    println!("{id}  ({count} exchanges)");
  }
  Ok(())
}

pub async fn history_show(
  config: &AppConfig,
  session_id: Uuid,
) -> anyhow::Result<()> {
  let store = open_history(config).await?;
  let records = store.load_session(session_id).await?;
  if records.is_empty() {
    anyhow::bail!("no records for session {session_id}");
  }
  for record in records {
    println!("[{}]", record.timestamp.to_rfc3339());
    println!("you> {}", record.user_input);
    println!("{}", record.bot_response);
    println!();
  }
  Ok(())
}

pub async fn history_delete(
  config: &AppConfig,
  session_id: Uuid,
) -> anyhow::Result<()> {
  let store = open_history(config).await?;
  let removed = store.delete_session(session_id).await?;
  println!("Deleted {removed} records from session {session_id}.");
  Ok(())
}

pub async fn history_export(
  config: &AppConfig,
  session_id: Uuid,
  out: Option<&Path>,
) -> anyhow::Result<()> {
  let store = open_history(config).await?;
  let records = store.load_session(session_id).await?;
  if records.is_empty() {
    anyhow::bail!("no records for session {session_id}");
  }

  let mut session = SessionContext::with_id(session_id);
  for record in records {
    session.append(Turn::User(record.user_input));
    session.append(Turn::Assistant(record.bot_response));
  }
  let text = session.to_plain_text();

  match out {
    Some(path) => {
      std::fs::write(path, text)
        .with_context(|| format!("writing {}", path.display()))?;
      println!("Exported session {session_id} to {}.", path.display());
    }
    None => println!("{text}"),
  }
  Ok(())
}

async fn open_history(config: &AppConfig) -> anyhow::Result<SqliteHistoryStore> {
  SqliteHistoryStore::open(&config.store_path)
    .await
    .with_context(|| format!("opening store at {}", config.store_path))
}
