//! Error taxonomy for the TableTalk pipeline.
//!
//! Backend errors (store, model) are caught at the component boundary and
//! converted to these variants; raw backend errors never cross a component
//! seam. Nothing is retried — every failure is surfaced once.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// No dataset has been uploaded, or the tabular store is unreachable.
  /// The session controller must short-circuit before any model call.
  #[error("no dataset available: {0}")]
  StoreUnavailable(String),

  /// The model call failed while generating SQL.
  #[error("SQL synthesis failed: {0}")]
  Synthesis(String),

  /// The synthesized SQL failed against the store (syntax, missing
  /// relation, type mismatch). Converted, never propagated raw.
  #[error("query execution failed: {0}")]
  Execution(String),

  /// The model call failed while narrating a result.
  #[error("narration failed: {0}")]
  Narration(String),

  /// History persistence failed after the answer was already displayed.
  #[error("history store error: {0}")]
  History(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
