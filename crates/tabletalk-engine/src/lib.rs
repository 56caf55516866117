//! The TableTalk pipeline: question → SQL → result → narration → history.
//!
//! One turn is strictly sequential — synthesize, execute, narrate, persist —
//! with no parallel sub-tasks. The only asynchronous-shaped behaviour is
//! narration streaming, a single-producer/single-consumer pull sequence
//! paced by the caller.

#![allow(async_fn_in_trait)]

pub mod narrator;
pub mod prompt;
pub mod session;
pub mod synthesizer;

pub use narrator::{NARRATION_ROW_LIMIT, Narrator};
pub use session::{EngineConfig, SessionController, TurnOutcome};
pub use synthesizer::QuerySynthesizer;

#[cfg(test)]
mod tests;
