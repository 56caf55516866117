//! End-to-end pipeline tests: in-memory SQLite stores plus a scripted
//! model standing in for the hosted backend.

use std::{
  collections::VecDeque,
  sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use tabletalk_core::{
  Error,
  dataset::Dataset,
  llm::{CompletionStream, LanguageModel},
  session::Turn,
  store::{HistoryStore, TabularStore},
};
use tabletalk_store_sqlite::{SqliteHistoryStore, SqliteTabularStore};
use thiserror::Error as ThisError;

use crate::{
  EngineConfig, NARRATION_ROW_LIMIT, SessionController, TurnOutcome,
  session::{EXECUTION_FAILED_MESSAGE, NO_RESULTS_MESSAGE, RESULT_TOO_LARGE_MESSAGE},
};

// ─── Scripted model ──────────────────────────────────────────────────────────

#[derive(Debug, ThisError)]
#[error("scripted model error: {0}")]
struct ScriptError(String);

/// Replays canned replies in order; counts every backend call so tests can
/// assert the model was (or was not) contacted.
struct ScriptedModel {
  replies: Mutex<VecDeque<String>>,
  calls:   AtomicUsize,
}

impl ScriptedModel {
  fn new<I, S>(replies: I) -> Arc<Self>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Arc::new(Self {
      replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
      calls:   AtomicUsize::new(0),
    })
  }

  fn call_count(&self) -> usize { self.calls.load(Ordering::SeqCst) }

  fn next_reply(&self) -> Result<String, ScriptError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self
      .replies
      .lock()
      .unwrap()
      .pop_front()
      .ok_or_else(|| ScriptError("script exhausted".into()))
  }
}

struct ScriptedStream {
  chunks: VecDeque<String>,
}

impl CompletionStream for ScriptedStream {
  type Error = ScriptError;

  async fn next_chunk(&mut self) -> Result<Option<String>, ScriptError> {
    Ok(self.chunks.pop_front())
  }
}

impl LanguageModel for ScriptedModel {
  type Error = ScriptError;
  type Stream = ScriptedStream;

  async fn complete(&self, _prompt: &str) -> Result<String, ScriptError> {
    self.next_reply()
  }

  async fn stream(&self, _prompt: &str) -> Result<ScriptedStream, ScriptError> {
    let reply = self.next_reply()?;
    // Word-boundary chunking approximates backend deltas.
    let chunks = reply.split_inclusive(' ').map(str::to_owned).collect();
    Ok(ScriptedStream { chunks })
  }

  async fn validate(&self) -> Result<(), ScriptError> { Ok(()) }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

async fn stores() -> (Arc<SqliteTabularStore>, Arc<SqliteHistoryStore>) {
  let tabular = SqliteTabularStore::open_in_memory().await.unwrap();
  let history = SqliteHistoryStore::open_in_memory().await.unwrap();
  (Arc::new(tabular), Arc::new(history))
}

fn people() -> Dataset {
  Dataset {
    columns: vec!["id".into(), "name".into()],
    rows:    vec![
      vec!["1".into(), "alice".into()],
      vec!["2".into(), "bob".into()],
    ],
  }
}

fn controller(
  tabular: &Arc<SqliteTabularStore>,
  history: &Arc<SqliteHistoryStore>,
  model: &Arc<ScriptedModel>,
) -> SessionController<SqliteTabularStore, SqliteHistoryStore, ScriptedModel> {
  // Zero chunk delay keeps tests fast; pacing is covered by the default.
  SessionController::with_config(
    tabular.clone(),
    history.clone(),
    model.clone(),
    EngineConfig {
      narration_row_limit: NARRATION_ROW_LIMIT,
      chunk_delay:         Duration::ZERO,
    },
  )
}

// ─── Turns ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn no_dataset_short_circuits_before_any_model_call() {
  let (tabular, history) = stores().await;
  let model = ScriptedModel::new(["SELECT 1"]);
  let mut ctl = controller(&tabular, &history, &model);

  let err = ctl.handle_turn("anything", |_| {}).await.unwrap_err();
  assert!(matches!(err, Error::StoreUnavailable(_)));

  // The model was never contacted and no history record was written.
  assert_eq!(model.call_count(), 0);
  assert!(history.session_ids().await.unwrap().is_empty());
  assert!(ctl.session().transcript().is_empty());
}

#[tokio::test]
async fn list_all_names_round_trip() {
  let (tabular, history) = stores().await;
  tabular.replace_dataset(people()).await.unwrap();

  let model = ScriptedModel::new([
    "SELECT name FROM dataset ORDER BY id",
    "There are **2** names: alice and bob.",
  ]);
  let mut ctl = controller(&tabular, &history, &model);

  let mut streamed = String::new();
  let outcome = ctl
    .handle_turn("list all names", |chunk| streamed.push_str(chunk))
    .await
    .unwrap();

  let TurnOutcome::Answered { narration, result } = outcome else {
    panic!("expected Answered");
  };
  assert_eq!(result.row_count(), 2);
  assert_eq!(narration, "There are **2** names: alice and bob.");
  // Chunks were forwarded incrementally and in order, none dropped.
  assert_eq!(streamed, narration);

  // Transcript: question, prose, result table.
  let turns = ctl.session().transcript();
  assert_eq!(turns.len(), 3);
  assert!(matches!(&turns[0], Turn::User(q) if q == "list all names"));
  assert!(matches!(&turns[1], Turn::Assistant(_)));
  assert!(matches!(&turns[2], Turn::ResultTable(r) if r.row_count() == 2));

  // Exactly one record, under the current session id.
  let records = history
    .load_session(ctl.session().session_id())
    .await
    .unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].user_input, "list all names");
  assert_eq!(records[0].bot_response, narration);
}

#[tokio::test]
async fn fenced_sql_reply_is_unwrapped_before_execution() {
  let (tabular, history) = stores().await;
  tabular.replace_dataset(people()).await.unwrap();

  let model = ScriptedModel::new([
    "```sql\nSELECT name FROM dataset\n```",
    "Both names listed.",
  ]);
  let mut ctl = controller(&tabular, &history, &model);

  let outcome = ctl.handle_turn("names?", |_| {}).await.unwrap();
  assert!(matches!(outcome, TurnOutcome::Answered { .. }));
}

#[tokio::test]
async fn bad_column_becomes_execution_failed_with_fallback_record() {
  let (tabular, history) = stores().await;
  tabular.replace_dataset(people()).await.unwrap();

  let model = ScriptedModel::new([
    "SELECT salary FROM dataset",
    "this narration must never be requested",
  ]);
  let mut ctl = controller(&tabular, &history, &model);

  let mut chunk_count = 0usize;
  let outcome = ctl
    .handle_turn("average salary?", |_| chunk_count += 1)
    .await
    .unwrap();

  assert!(matches!(outcome, TurnOutcome::ExecutionFailed(_)));
  assert_eq!(chunk_count, 0);
  // Only the synthesis call happened.
  assert_eq!(model.call_count(), 1);

  let records = history
    .load_session(ctl.session().session_id())
    .await
    .unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].bot_response, EXECUTION_FAILED_MESSAGE);

  // The session stays usable: the next turn proceeds normally.
  assert!(matches!(
    ctl.session().transcript().last(),
    Some(Turn::Assistant(msg)) if msg == EXECUTION_FAILED_MESSAGE
  ));
}

#[tokio::test]
async fn empty_result_yields_fixed_message() {
  let (tabular, history) = stores().await;
  tabular.replace_dataset(people()).await.unwrap();

  let model =
    ScriptedModel::new(["SELECT name FROM dataset WHERE id = '999'"]);
  let mut ctl = controller(&tabular, &history, &model);

  let outcome = ctl.handle_turn("who is 999?", |_| {}).await.unwrap();
  assert!(matches!(outcome, TurnOutcome::EmptyResult));
  assert_eq!(model.call_count(), 1);

  let records = history
    .load_session(ctl.session().session_id())
    .await
    .unwrap();
  assert_eq!(records[0].bot_response, NO_RESULTS_MESSAGE);
}

#[tokio::test]
async fn oversized_result_skips_narration_and_substitutes_fallback() {
  let (tabular, history) = stores().await;
  tabular.replace_dataset(people()).await.unwrap();

  let model = ScriptedModel::new([
    "SELECT * FROM dataset",
    "this narration must never be requested",
  ]);
  let mut ctl = SessionController::with_config(
    tabular.clone(),
    history.clone(),
    model.clone(),
    EngineConfig { narration_row_limit: 1, chunk_delay: Duration::ZERO },
  );

  let mut chunk_count = 0usize;
  let outcome = ctl
    .handle_turn("show everything", |_| chunk_count += 1)
    .await
    .unwrap();

  let TurnOutcome::Answered { narration, result } = outcome else {
    panic!("expected Answered");
  };
  // No chunks, no narration call; the fallback text stands in.
  assert_eq!(chunk_count, 0);
  assert_eq!(model.call_count(), 1);
  assert_eq!(narration, RESULT_TOO_LARGE_MESSAGE);
  assert_eq!(result.row_count(), 2);

  let records = history
    .load_session(ctl.session().session_id())
    .await
    .unwrap();
  assert_eq!(records[0].bot_response, RESULT_TOO_LARGE_MESSAGE);
}

#[tokio::test]
async fn results_within_the_limit_always_narrate() {
  let (tabular, history) = stores().await;
  tabular.replace_dataset(people()).await.unwrap();

  let model = ScriptedModel::new([
    "SELECT name FROM dataset",
    "alice and bob.",
  ]);
  let mut ctl = controller(&tabular, &history, &model);

  let mut chunk_count = 0usize;
  ctl
    .handle_turn("names", |_| chunk_count += 1)
    .await
    .unwrap();
  assert!(chunk_count > 0);
}

#[test]
fn narration_row_limit_is_the_compatibility_value() {
  assert_eq!(NARRATION_ROW_LIMIT, 104);
}

// ─── Session lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn clear_empties_transcript_but_not_history() {
  let (tabular, history) = stores().await;
  tabular.replace_dataset(people()).await.unwrap();

  let model = ScriptedModel::new(["SELECT name FROM dataset", "two names."]);
  let mut ctl = controller(&tabular, &history, &model);
  ctl.handle_turn("names", |_| {}).await.unwrap();

  ctl.clear();
  assert!(ctl.session().transcript().is_empty());

  let records = history
    .load_session(ctl.session().session_id())
    .await
    .unwrap();
  assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn restore_replays_persisted_turns() {
  let (tabular, history) = stores().await;
  tabular.replace_dataset(people()).await.unwrap();

  let model = ScriptedModel::new(["SELECT name FROM dataset", "two names."]);
  let mut ctl = controller(&tabular, &history, &model);
  ctl.handle_turn("names", |_| {}).await.unwrap();
  let session_id = ctl.session().session_id();

  let fresh_model = ScriptedModel::new(Vec::<String>::new());
  let mut resumed =
    controller(&tabular, &history, &fresh_model).resume(session_id);
  let loaded = resumed.restore().await.unwrap();

  assert_eq!(loaded, 1);
  let turns = resumed.session().transcript();
  assert_eq!(turns.len(), 2);
  assert!(matches!(&turns[0], Turn::User(q) if q == "names"));
  assert!(matches!(&turns[1], Turn::Assistant(a) if a == "two names."));
}
