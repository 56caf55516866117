//! [`AnthropicClient`] — reqwest-based Messages API client.

use std::{collections::VecDeque, time::Duration};

use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tabletalk_core::llm::{CompletionStream, LanguageModel};

use crate::{
  Error, Result,
  sse::{SseEvent, SseParser},
};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 8192;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const COMPLETE_TIMEOUT: Duration = Duration::from_secs(120);

// ─── Config ──────────────────────────────────────────────────────────────────

/// Connection settings for the Messages API.
#[derive(Debug, Clone)]
pub struct LlmConfig {
  pub api_key:    String,
  pub model:      String,
  pub base_url:   String,
  pub max_tokens: u32,
}

impl LlmConfig {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key:    api_key.into(),
      model:      DEFAULT_MODEL.to_owned(),
      base_url:   DEFAULT_BASE_URL.to_owned(),
      max_tokens: DEFAULT_MAX_TOKENS,
    }
  }

  /// Read the API key from `ANTHROPIC_API_KEY`, and an optional model
  /// override from `TABLETALK_MODEL`.
  pub fn from_env() -> Result<Self> {
    let api_key =
      std::env::var("ANTHROPIC_API_KEY").map_err(|_| Error::MissingApiKey)?;
    let mut config = Self::new(api_key);
    if let Ok(model) = std::env::var("TABLETALK_MODEL")
      && !model.is_empty()
    {
      config.model = model;
    }
    Ok(config)
  }

  pub fn with_model(mut self, model: impl Into<String>) -> Self {
    self.model = model.into();
    self
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async client for the Anthropic Messages API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based. Requests
/// use deterministic decoding: temperature 0 and top_p 0.
#[derive(Clone)]
pub struct AnthropicClient {
  client: reqwest::Client,
  config: LlmConfig,
}

#[derive(Deserialize)]
struct MessagesResponse {
  content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
  #[serde(rename = "type")]
  kind: String,
  text: Option<String>,
}

impl AnthropicClient {
  pub fn new(config: LlmConfig) -> Result<Self> {
    // No total timeout on the client: it would also cap streaming
    // responses. The one-shot path sets its own per-request deadline.
    let client = reqwest::Client::builder()
      .connect_timeout(CONNECT_TIMEOUT)
      .build()?;
    Ok(Self { client, config })
  }

  fn request_body(&self, prompt: &str, stream: bool) -> serde_json::Value {
    json!({
      "model": self.config.model,
      "max_tokens": self.config.max_tokens,
      "temperature": 0,
      "top_p": 0,
      "stream": stream,
      "messages": [{ "role": "user", "content": prompt }],
    })
  }

  fn post(&self, prompt: &str, stream: bool) -> reqwest::RequestBuilder {
    self
      .client
      .post(&self.config.base_url)
      .header("x-api-key", &self.config.api_key)
      .header("anthropic-version", ANTHROPIC_VERSION)
      .json(&self.request_body(prompt, stream))
  }

  async fn error_for_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(Error::Api { status: status.as_u16(), message })
  }
}

impl LanguageModel for AnthropicClient {
  type Error = Error;
  type Stream = AnthropicStream;

  async fn complete(&self, prompt: &str) -> Result<String> {
    let resp = self
      .post(prompt, false)
      .timeout(COMPLETE_TIMEOUT)
      .send()
      .await?;
    let resp = Self::error_for_status(resp).await?;

    let body: MessagesResponse = resp.json().await?;
    let text: String = body
      .content
      .iter()
      .filter(|block| block.kind == "text")
      .filter_map(|block| block.text.as_deref())
      .collect();

    if text.is_empty() {
      return Err(Error::EmptyCompletion);
    }
    Ok(text)
  }

  async fn stream(&self, prompt: &str) -> Result<AnthropicStream> {
    let resp = self.post(prompt, true).send().await?;
    let resp = Self::error_for_status(resp).await?;

    Ok(AnthropicStream {
      body:    resp.bytes_stream().boxed(),
      parser:  SseParser::new(),
      pending: VecDeque::new(),
      done:    false,
    })
  }

  async fn validate(&self) -> Result<()> {
    // Trivial probe; success gates the rest of the process session.
    self.complete("Hello").await?;
    tracing::info!(model = %self.config.model, "credential check passed");
    Ok(())
  }
}

// ─── Stream ──────────────────────────────────────────────────────────────────

/// Pull-based chunk sequence over the SSE response body.
///
/// Production is consumer-driven: the next network read happens only when
/// the caller asks for the next chunk, and dropping the stream aborts the
/// underlying request.
pub struct AnthropicStream {
  body:    BoxStream<'static, reqwest::Result<Bytes>>,
  parser:  SseParser,
  pending: VecDeque<String>,
  done:    bool,
}

impl CompletionStream for AnthropicStream {
  type Error = Error;

  async fn next_chunk(&mut self) -> Result<Option<String>> {
    loop {
      if let Some(chunk) = self.pending.pop_front() {
        return Ok(Some(chunk));
      }
      if self.done {
        return Ok(None);
      }

      match self.body.next().await {
        Some(bytes) => {
          for event in self.parser.feed(&bytes?)? {
            match event {
              SseEvent::Text(text) => self.pending.push_back(text),
              SseEvent::Stop => self.done = true,
            }
          }
        }
        // Body ended without an explicit message_stop; treat as complete.
        None => self.done = true,
      }
    }
  }
}
