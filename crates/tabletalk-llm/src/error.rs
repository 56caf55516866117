//! Error type for `tabletalk-llm`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("ANTHROPIC_API_KEY is not set")]
  MissingApiKey,

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("api error (status {status}): {message}")]
  Api { status: u16, message: String },

  #[error("malformed event stream: {0}")]
  EventStream(String),

  #[error("completion contained no text content")]
  EmptyCompletion,

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
