//! Schema management for the history database.
//!
//! The history schema is ensured idempotently at every open. A legacy
//! layout without the `session_id` column is migrated in place: the column
//! is added and every pre-existing row is backfilled with one freshly
//! generated session id shared across all of them. No row is ever lost.

use rusqlite::Connection;
use uuid::Uuid;

/// Current history DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const HISTORY_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS chat_history (
    id           TEXT PRIMARY KEY,
    session_id   TEXT,
    user_input   TEXT,
    bot_response TEXT,
    timestamp    DATETIME DEFAULT CURRENT_TIMESTAMP
);
";

/// Create or migrate the `chat_history` table.
///
/// Running this against an already-correct relation alters neither its
/// structure nor its data.
pub fn ensure_history_schema(conn: &Connection) -> rusqlite::Result<()> {
  let table_exists: bool = conn
    .query_row(
      "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'chat_history'",
      [],
      |_| Ok(true),
    )
    .unwrap_or(false);

  if !table_exists {
    conn.execute_batch(HISTORY_SCHEMA)?;
    return Ok(());
  }

  let mut stmt = conn.prepare("PRAGMA table_info(chat_history)")?;
  let columns: Vec<String> = stmt
    .query_map([], |row| row.get::<_, String>(1))?
    .collect::<rusqlite::Result<_>>()?;

  if !columns.iter().any(|c| c == "session_id") {
    conn.execute("ALTER TABLE chat_history ADD COLUMN session_id TEXT", [])?;

    // One fresh id shared by every legacy row, so pre-existing history
    // stays reachable under a single session.
    let backfill_id = Uuid::new_v4().hyphenated().to_string();
    let updated = conn.execute(
      "UPDATE chat_history SET session_id = ?1 WHERE session_id IS NULL",
      rusqlite::params![backfill_id],
    )?;
    tracing::info!(updated, "migrated chat_history: added session_id column");
  }

  Ok(())
}
