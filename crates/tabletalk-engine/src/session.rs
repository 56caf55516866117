//! The session controller — orchestrates one turn end to end.
//!
//! Per turn: inspect schema → synthesize → execute → narrate → persist.
//! Every branch leaves the session usable for the next question; backend
//! failures surface once as user-facing messages and are never retried.

use std::{sync::Arc, time::Duration};

use tabletalk_core::{
  Error, Result,
  dataset::TabularResult,
  history::NewHistoryRecord,
  llm::LanguageModel,
  session::{SessionContext, Turn},
  store::{HistoryStore, TabularStore},
};
use uuid::Uuid;

use crate::{
  narrator::{CHUNK_DELAY, NARRATION_ROW_LIMIT, Narrator},
  synthesizer::QuerySynthesizer,
};

// ─── Fixed user-facing messages ──────────────────────────────────────────────

pub const EXECUTION_FAILED_MESSAGE: &str = "The query encountered an error.";
pub const NO_RESULTS_MESSAGE: &str = "The query returned no results.";
pub const RESULT_TOO_LARGE_MESSAGE: &str =
  "The result is too large to summarize; showing the raw rows instead.";

// ─── Config ──────────────────────────────────────────────────────────────────

/// Tuning knobs for the pipeline. The defaults are the compatibility
/// values; treat overrides as configuration points, not stable API.
#[derive(Debug, Clone)]
pub struct EngineConfig {
  pub narration_row_limit: usize,
  pub chunk_delay:         Duration,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self { narration_row_limit: NARRATION_ROW_LIMIT, chunk_delay: CHUNK_DELAY }
  }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// The result of one completed turn.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
  /// The narration text shown to the user, plus the full result table.
  Answered {
    narration: String,
    result:    TabularResult,
  },
  /// The synthesized SQL failed against the store; carries the backend
  /// message for diagnostics (the transcript gets the fixed message).
  ExecutionFailed(String),
  /// The query ran but matched nothing.
  EmptyResult,
}

// ─── Controller ──────────────────────────────────────────────────────────────

/// Owns one session's context and drives the pipeline for each question.
///
/// The model handle is shared by reference across the synthesizer and the
/// narrator — constructed once, read-only afterwards.
pub struct SessionController<T, H, M> {
  tabular:     Arc<T>,
  history:     Arc<H>,
  synthesizer: QuerySynthesizer<M>,
  narrator:    Narrator<M>,
  session:     SessionContext,
}

impl<T, H, M> SessionController<T, H, M>
where
  T: TabularStore,
  H: HistoryStore,
  M: LanguageModel,
{
  pub fn new(tabular: Arc<T>, history: Arc<H>, model: Arc<M>) -> Self {
    Self::with_config(tabular, history, model, EngineConfig::default())
  }

  pub fn with_config(
    tabular: Arc<T>,
    history: Arc<H>,
    model: Arc<M>,
    config: EngineConfig,
  ) -> Self {
    Self {
      tabular,
      history,
      synthesizer: QuerySynthesizer::new(model.clone()),
      narrator: Narrator::with_limits(
        model,
        config.narration_row_limit,
        config.chunk_delay,
      ),
      session: SessionContext::new(),
    }
  }

  /// Resume an existing session token (e.g. one picked from the history
  /// list) instead of minting a new one.
  pub fn resume(mut self, session_id: Uuid) -> Self {
    self.session = SessionContext::with_id(session_id);
    self
  }

  pub fn session(&self) -> &SessionContext { &self.session }

  /// Empty the in-memory transcript. Persisted history rows survive.
  pub fn clear(&mut self) { self.session.clear(); }

  /// Replay this session's persisted records into the transcript,
  /// returning how many were loaded.
  pub async fn restore(&mut self) -> Result<usize> {
    let records = self
      .history
      .load_session(self.session.session_id())
      .await
      .map_err(|e| Error::History(e.to_string()))?;

    let count = records.len();
    for record in records {
      self.session.append(Turn::User(record.user_input));
      self.session.append(Turn::Assistant(record.bot_response));
    }
    Ok(count)
  }

  /// Run one full turn. Narration chunks are forwarded to `on_chunk` as
  /// they arrive, before the turn completes.
  ///
  /// Errors returned here (`StoreUnavailable`, `Synthesis`, `Narration`)
  /// abort the turn before an answer exists, so no history record is
  /// written for them. Execution failures and empty results complete the
  /// turn normally with a fixed message.
  pub async fn handle_turn(
    &mut self,
    question: &str,
    mut on_chunk: impl FnMut(&str),
  ) -> Result<TurnOutcome> {
    // Schema first: with no dataset there is nothing to ask the model.
    let schema = self
      .tabular
      .inspect_schema()
      .await
      .map_err(|e| Error::StoreUnavailable(e.to_string()))?;

    self.session.append(Turn::User(question.to_owned()));

    let sql = self.synthesizer.synthesize(question, &schema).await?;

    let result = match self.tabular.execute(&sql).await {
      Ok(result) => result,
      Err(e) => {
        tracing::warn!(error = %e, %sql, "query execution failed");
        self.finish_turn(question, EXECUTION_FAILED_MESSAGE).await;
        return Ok(TurnOutcome::ExecutionFailed(e.to_string()));
      }
    };

    if result.is_empty() {
      self.finish_turn(question, NO_RESULTS_MESSAGE).await;
      return Ok(TurnOutcome::EmptyResult);
    }

    let narration = match self
      .narrator
      .narrate(question, Some(&result), &sql)
      .await?
    {
      Some(mut stream) => {
        let mut text = String::new();
        while let Some(chunk) = stream.next_chunk().await? {
          on_chunk(&chunk);
          text.push_str(&chunk);
        }
        if text.is_empty() {
          // The backend completed without producing any text.
          RESULT_TOO_LARGE_MESSAGE.to_owned()
        } else {
          text
        }
      }
      // Result exceeded the narration window: deterministic fallback.
      None => RESULT_TOO_LARGE_MESSAGE.to_owned(),
    };

    self.session.append(Turn::Assistant(narration.clone()));
    self.session.append(Turn::ResultTable(result.clone()));
    self.persist(question, &narration).await;

    Ok(TurnOutcome::Answered { narration, result })
  }

  /// Append the fixed assistant message and persist the record. Shared
  /// tail of the failure branches.
  async fn finish_turn(&mut self, question: &str, message: &str) {
    self.session.append(Turn::Assistant(message.to_owned()));
    self.persist(question, message).await;
  }

  /// Best-effort history write, after the answer is already displayed. A
  /// failure here is logged, not surfaced — the chat log is not an audit
  /// trail.
  async fn persist(&self, question: &str, answer: &str) {
    let record = NewHistoryRecord {
      session_id:   self.session.session_id(),
      user_input:   question.to_owned(),
      bot_response: answer.to_owned(),
    };
    if let Err(e) = self.history.append(record).await {
      tracing::warn!(error = %e, "failed to persist history record");
    }
  }
}
