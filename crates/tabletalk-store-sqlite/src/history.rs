//! [`SqliteHistoryStore`] — the SQLite implementation of [`HistoryStore`].

use std::path::Path;

use tabletalk_core::{
  history::{HistoryRecord, NewHistoryRecord},
  store::HistoryStore,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{RawHistoryRecord, decode_uuid, encode_uuid},
  schema::ensure_history_schema,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The append-only chat-history log backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteHistoryStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteHistoryStore {
  /// Open (or create) the history database at `path` and ensure its schema,
  /// migrating a legacy layout if necessary.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.ensure_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.ensure_schema().await?;
    Ok(store)
  }

  /// Idempotent schema creation/migration; safe to call repeatedly.
  pub async fn ensure_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        ensure_history_schema(conn)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── HistoryStore impl ───────────────────────────────────────────────────────

impl HistoryStore for SqliteHistoryStore {
  type Error = Error;

  async fn append(&self, record: NewHistoryRecord) -> Result<HistoryRecord> {
    let id = Uuid::new_v4();
    let id_str = encode_uuid(id);
    let session_str = encode_uuid(record.session_id);
    let user_input = record.user_input.clone();
    let bot_response = record.bot_response.clone();

    // The timestamp is assigned by the store (CURRENT_TIMESTAMP default),
    // so read the inserted row back to return the authoritative value.
    let raw: RawHistoryRecord = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO chat_history (id, session_id, user_input, bot_response)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, session_str, user_input, bot_response],
        )?;

        let raw = conn.query_row(
          "SELECT id, session_id, user_input, bot_response, timestamp
           FROM chat_history WHERE id = ?1",
          rusqlite::params![id_str],
          |row| {
            Ok(RawHistoryRecord {
              id:           row.get(0)?,
              session_id:   row.get(1)?,
              user_input:   row.get(2)?,
              bot_response: row.get(3)?,
              timestamp:    row.get(4)?,
            })
          },
        )?;
        Ok(raw)
      })
      .await?;

    raw.into_record()
  }

  async fn load_session(&self, session_id: Uuid) -> Result<Vec<HistoryRecord>> {
    let session_str = encode_uuid(session_id);

    let raws: Vec<RawHistoryRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, session_id, user_input, bot_response, timestamp
           FROM chat_history
           WHERE session_id = ?1
           ORDER BY timestamp, rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![session_str], |row| {
            Ok(RawHistoryRecord {
              id:           row.get(0)?,
              session_id:   row.get(1)?,
              user_input:   row.get(2)?,
              bot_response: row.get(3)?,
              timestamp:    row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHistoryRecord::into_record).collect()
  }

  async fn session_ids(&self) -> Result<Vec<Uuid>> {
    let ids: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT session_id FROM chat_history
           WHERE session_id IS NOT NULL
           GROUP BY session_id
           ORDER BY MAX(timestamp) DESC, MAX(rowid) DESC",
        )?;
        let rows = stmt
          .query_map([], |row| row.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(|s| decode_uuid(s)).collect()
  }

  async fn delete_session(&self, session_id: Uuid) -> Result<usize> {
    let session_str = encode_uuid(session_id);

    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM chat_history WHERE session_id = ?1",
          rusqlite::params![session_str],
        )?;
        Ok(n)
      })
      .await?;

    Ok(deleted)
  }
}
