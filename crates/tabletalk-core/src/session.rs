//! Session and transcript types.
//!
//! A session is an opaque token plus an ordered in-memory transcript. The
//! transcript is append-only; the only mutation is an explicit `clear`,
//! which empties the transcript for the active session without touching
//! persisted history rows.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dataset::TabularResult;

// ─── Turns ───────────────────────────────────────────────────────────────────

/// One entry in a session transcript. Result tables are kept as separate
/// turns so a renderer can display the prose and the table independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "snake_case")]
pub enum Turn {
  User(String),
  Assistant(String),
  ResultTable(TabularResult),
}

impl Turn {
  /// Plain-text rendering used by the transcript export.
  pub fn to_plain_line(&self) -> String {
    match self {
      Self::User(text) => format!("user: {text}"),
      Self::Assistant(text) => format!("assistant: {text}"),
      Self::ResultTable(result) => {
        format!("result_table: {} rows × {} columns", result.row_count(), result.columns.len())
      }
    }
  }
}

// ─── Session context ─────────────────────────────────────────────────────────

/// Per-session state owned by the session controller. Created at session
/// start, dropped at session end; never shared across sessions.
#[derive(Debug, Clone)]
pub struct SessionContext {
  session_id: Uuid,
  transcript: Vec<Turn>,
}

impl SessionContext {
  /// Start a fresh session with a newly minted token.
  pub fn new() -> Self {
    Self { session_id: Uuid::new_v4(), transcript: Vec::new() }
  }

  /// Resume under an existing session token (e.g. replaying stored history).
  pub fn with_id(session_id: Uuid) -> Self {
    Self { session_id, transcript: Vec::new() }
  }

  pub fn session_id(&self) -> Uuid { self.session_id }

  pub fn transcript(&self) -> &[Turn] { &self.transcript }

  pub fn append(&mut self, turn: Turn) { self.transcript.push(turn); }

  /// Empty the transcript. Persisted history rows are not affected.
  pub fn clear(&mut self) { self.transcript.clear(); }

  /// Render the transcript as `role: content` lines, one per turn.
  pub fn to_plain_text(&self) -> String {
    self
      .transcript
      .iter()
      .map(Turn::to_plain_line)
      .collect::<Vec<_>>()
      .join("\n")
  }
}

impl Default for SessionContext {
  fn default() -> Self { Self::new() }
}
