//! Anthropic Messages API client implementing [`LanguageModel`].
//!
//! One client handle is constructed at process start and shared by
//! reference across the query synthesizer and the narrator. Decoding is
//! deterministic (temperature 0, top_p 0) so SQL synthesis is as
//! reproducible as the backend allows.

mod client;
mod sse;

pub mod error;

pub use client::{AnthropicClient, AnthropicStream, LlmConfig};
pub use error::{Error, Result};
