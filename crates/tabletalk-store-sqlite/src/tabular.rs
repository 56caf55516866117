//! [`SqliteTabularStore`] — the SQLite implementation of [`TabularStore`].
//!
//! One managed relation, `dataset`, replaced wholesale on every upload.
//! Every column is declared TEXT; uploaded values are coerced to text by
//! the ingest layer.

use std::path::Path;

use rusqlite::types::ValueRef;
use tabletalk_core::{
  dataset::{Column, Dataset, TableSchema, TabularResult},
  store::TabularStore,
};

use crate::{Error, Result};

/// Name of the single managed relation. The synthesizer prompt names it, so
/// synthesized SQL targets it consistently.
pub const DATASET_TABLE: &str = "dataset";

// ─── Store ───────────────────────────────────────────────────────────────────

/// The tabular store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteTabularStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteTabularStore {
  /// Open (or create) the dataset database at `path`.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Ok(Self { conn })
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self { conn })
  }
}

/// Double-quote an identifier, escaping embedded quotes. Uploaded headers
/// are arbitrary text and become column names verbatim.
fn quote_ident(name: &str) -> String {
  format!("\"{}\"", name.replace('"', "\"\""))
}

// ─── TabularStore impl ───────────────────────────────────────────────────────

impl TabularStore for SqliteTabularStore {
  type Error = Error;

  async fn replace_dataset(&self, dataset: Dataset) -> Result<()> {
    if dataset.columns.is_empty() {
      return Err(Error::EmptyHeader);
    }

    let row_count = dataset.row_count();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(&format!("DROP TABLE IF EXISTS {DATASET_TABLE}"), [])?;

        let column_defs = dataset
          .columns
          .iter()
          .map(|c| format!("{} TEXT", quote_ident(c)))
          .collect::<Vec<_>>()
          .join(", ");
        tx.execute(&format!("CREATE TABLE {DATASET_TABLE} ({column_defs})"), [])?;

        let placeholders = (1..=dataset.columns.len())
          .map(|i| format!("?{i}"))
          .collect::<Vec<_>>()
          .join(", ");

        {
          let mut stmt = tx
            .prepare(&format!("INSERT INTO {DATASET_TABLE} VALUES ({placeholders})"))?;
          let width = dataset.columns.len();
          for row in &dataset.rows {
            // Pad short rows so every insert matches the header width.
            let cells =
              (0..width).map(|i| row.get(i).cloned().unwrap_or_default());
            stmt.execute(rusqlite::params_from_iter(cells))?;
          }
        }

        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(rows = row_count, "replaced dataset");
    Ok(())
  }

  async fn inspect_schema(&self) -> Result<TableSchema> {
    let columns: Vec<Column> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("PRAGMA table_info({DATASET_TABLE})"))?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Column {
              name:          row.get(1)?,
              declared_type: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    // PRAGMA table_info returns zero rows for a missing relation; callers
    // treat "no dataset" as a precondition failure, not an empty schema.
    if columns.is_empty() {
      return Err(Error::NoDataset);
    }

    Ok(TableSchema { table: DATASET_TABLE.to_owned(), columns })
  }

  async fn execute(&self, sql: &str) -> Result<TabularResult> {
    let sql = sql.to_owned();

    let result = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<String> =
          stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let mut materialized = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
          let mut cells = Vec::with_capacity(width);
          for i in 0..width {
            let cell = match row.get_ref(i)? {
              ValueRef::Null => None,
              ValueRef::Integer(v) => Some(v.to_string()),
              ValueRef::Real(v) => Some(v.to_string()),
              ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
              ValueRef::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
            };
            cells.push(cell);
          }
          materialized.push(cells);
        }

        Ok(TabularResult { columns, rows: materialized })
      })
      .await?;

    Ok(result)
  }
}
