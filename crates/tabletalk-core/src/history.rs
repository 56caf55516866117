//! Chat-history records — the persisted (session, question, answer) log.
//!
//! Records are append-only. The only delete operation removes all records
//! for a single session id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One persisted question/answer pair. `id` is globally unique; `session_id`
/// groups records for replay; replay order is `timestamp` ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
  pub id:           Uuid,
  pub session_id:   Uuid,
  pub user_input:   String,
  pub bot_response: String,
  /// Assigned by the store at insert time.
  pub timestamp:    DateTime<Utc>,
}

/// Input to [`crate::store::HistoryStore::append`].
/// `id` and `timestamp` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewHistoryRecord {
  pub session_id:   Uuid,
  pub user_input:   String,
  pub bot_response: String,
}
