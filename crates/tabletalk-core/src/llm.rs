//! The `LanguageModel` trait — the seam between the pipeline and the
//! hosted model backend.
//!
//! One long-lived client handle is constructed at process start and shared
//! by reference (read-only after construction) across the query synthesizer
//! and the narrator. The engine never constructs clients ad hoc.

use std::future::Future;

// ─── Streaming ───────────────────────────────────────────────────────────────

/// A lazy, pull-based sequence of text chunks from a streaming completion.
///
/// Single consumer, forward-only, not restartable. Each chunk is produced
/// only when the consumer asks for it; dropping the stream stops
/// production. `Ok(None)` means the backend signalled completion.
pub trait CompletionStream: Send {
  type Error: std::error::Error + Send + Sync + 'static;

  fn next_chunk(
    &mut self,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;
}

// ─── Model client ────────────────────────────────────────────────────────────

/// A hosted language-model backend.
///
/// Implementations must use deterministic decoding (temperature 0, top_p 0)
/// so that SQL synthesis is as reproducible as possible given a
/// non-deterministic backend.
pub trait LanguageModel: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
  type Stream: CompletionStream<Error = Self::Error>;

  /// One-shot completion; returns the full response text.
  fn complete<'a>(
    &'a self,
    prompt: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// Streaming completion; chunks arrive in order, none dropped.
  fn stream<'a>(
    &'a self,
    prompt: &'a str,
  ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'a;

  /// Credential probe: a trivial request whose success gates access to the
  /// rest of the process session.
  fn validate(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
