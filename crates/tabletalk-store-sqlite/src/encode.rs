//! Encoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! UUIDs are stored as hyphenated lowercase strings. History timestamps are
//! written by SQLite's `CURRENT_TIMESTAMP` default (`YYYY-MM-DD HH:MM:SS`,
//! UTC); RFC 3339 is also accepted on read.

use chrono::{DateTime, NaiveDateTime, Utc};
use tabletalk_core::history::HistoryRecord;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn decode_history_ts(s: &str) -> Result<DateTime<Utc>> {
  if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
    return Ok(naive.and_utc());
  }
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::TimestampParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `chat_history` row.
pub struct RawHistoryRecord {
  pub id:           String,
  pub session_id:   String,
  pub user_input:   Option<String>,
  pub bot_response: Option<String>,
  pub timestamp:    String,
}

impl RawHistoryRecord {
  pub fn into_record(self) -> Result<HistoryRecord> {
    Ok(HistoryRecord {
      id:           decode_uuid(&self.id)?,
      session_id:   decode_uuid(&self.session_id)?,
      user_input:   self.user_input.unwrap_or_default(),
      bot_response: self.bot_response.unwrap_or_default(),
      timestamp:    decode_history_ts(&self.timestamp)?,
    })
  }
}
