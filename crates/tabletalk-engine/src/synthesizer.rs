//! SQL synthesis — one model call per question, deterministic decoding.

use std::sync::Arc;

use tabletalk_core::{Error, Result, dataset::TableSchema, llm::LanguageModel};

use crate::prompt::synthesis_prompt;

/// Translates a natural-language question into a single SQL statement.
///
/// The raw model text is returned with no syntax or safety validation —
/// a known gap, not a hardened boundary. The only post-processing is
/// stripping accidental markdown code fences.
pub struct QuerySynthesizer<M> {
  model: Arc<M>,
}

impl<M: LanguageModel> QuerySynthesizer<M> {
  pub fn new(model: Arc<M>) -> Self { Self { model } }

  pub async fn synthesize(
    &self,
    question: &str,
    schema: &TableSchema,
  ) -> Result<String> {
    let prompt = synthesis_prompt(question, schema);
    let raw = self
      .model
      .complete(&prompt)
      .await
      .map_err(|e| Error::Synthesis(e.to_string()))?;

    let sql = strip_code_fences(&raw).to_owned();
    tracing::debug!(%sql, "synthesized query");
    Ok(sql)
  }
}

/// Remove one layer of ```sql / ``` fencing, if present.
pub fn strip_code_fences(raw: &str) -> &str {
  let trimmed = raw.trim();
  let inner = trimmed
    .strip_prefix("```sql")
    .or_else(|| trimmed.strip_prefix("```"))
    .unwrap_or(trimmed);
  inner.strip_suffix("```").unwrap_or(inner).trim()
}
