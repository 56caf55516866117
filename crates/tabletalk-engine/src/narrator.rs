//! Result narration — streamed prose over a bounded result set.
//!
//! The narrator only speaks when there is something worth summarizing: a
//! non-empty result within the row limit. Outside that window it yields
//! nothing, and the session controller substitutes a fixed message — the
//! narrator never invents a fallback itself.

use std::{sync::Arc, time::Duration};

use tabletalk_core::{
  Error, Result,
  dataset::TabularResult,
  llm::{CompletionStream, LanguageModel},
};

use crate::prompt::narration_prompt;

/// Row-count ceiling above which results are not narrated. Preserved as a
/// literal for compatibility with existing behaviour.
pub const NARRATION_ROW_LIMIT: usize = 104;

/// Pause inserted between chunks, trading a little latency for smoother
/// incremental rendering.
pub const CHUNK_DELAY: Duration = Duration::from_millis(1);

// ─── Narrator ────────────────────────────────────────────────────────────────

pub struct Narrator<M> {
  model:     Arc<M>,
  row_limit: usize,
  delay:     Duration,
}

impl<M: LanguageModel> Narrator<M> {
  pub fn new(model: Arc<M>) -> Self {
    Self { model, row_limit: NARRATION_ROW_LIMIT, delay: CHUNK_DELAY }
  }

  pub fn with_limits(model: Arc<M>, row_limit: usize, delay: Duration) -> Self {
    Self { model, row_limit, delay }
  }

  /// Start narrating `result`, or return `None` when the precondition
  /// fails (result absent, empty, or over the row limit).
  pub async fn narrate(
    &self,
    question: &str,
    result: Option<&TabularResult>,
    sql: &str,
  ) -> Result<Option<Narration<M::Stream>>> {
    let Some(result) = result else {
      return Ok(None);
    };
    if result.is_empty() || result.row_count() > self.row_limit {
      tracing::debug!(rows = result.row_count(), "result outside narration window");
      return Ok(None);
    }

    let prompt =
      narration_prompt(question, &result.to_field_keyed_json(), sql);
    let stream = self
      .model
      .stream(&prompt)
      .await
      .map_err(|e| Error::Narration(e.to_string()))?;

    Ok(Some(Narration { stream, delay: self.delay }))
  }
}

// ─── Narration stream ────────────────────────────────────────────────────────

/// The pull-based chunk sequence for one narration.
///
/// Forward-only and not restartable; dropping it stops production. Each
/// chunk is followed by a small cooperative delay before the next one is
/// requested.
pub struct Narration<S> {
  stream: S,
  delay:  Duration,
}

impl<S: CompletionStream> Narration<S> {
  pub async fn next_chunk(&mut self) -> Result<Option<String>> {
    let chunk = self
      .stream
      .next_chunk()
      .await
      .map_err(|e| Error::Narration(e.to_string()))?;

    if chunk.is_some() && !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
    Ok(chunk)
  }
}
