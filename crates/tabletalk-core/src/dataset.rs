//! Dataset, schema, and tabular-result types.
//!
//! One dataset is live at a time. It is replaced wholesale on each upload;
//! every column is declared TEXT regardless of its source type, so
//! downstream SQL cannot rely on numeric comparison semantics without
//! explicit casts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Schema ──────────────────────────────────────────────────────────────────

/// One column of the managed relation as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
  pub name:          String,
  /// Declared SQL type. Always `TEXT` for uploaded datasets.
  pub declared_type: String,
}

/// Live schema of the managed relation, read from store metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
  /// Name of the single managed relation.
  pub table:   String,
  pub columns: Vec<Column>,
}

impl TableSchema {
  pub fn is_empty(&self) -> bool { self.columns.is_empty() }
}

// ─── Dataset ─────────────────────────────────────────────────────────────────

/// A parsed upload: the header row plus zero or more rows of text values.
/// Rows are padded or truncated by the ingest layer to the header width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
  pub columns: Vec<String>,
  pub rows:    Vec<Vec<String>>,
}

impl Dataset {
  pub fn row_count(&self) -> usize { self.rows.len() }
}

// ─── Tabular result ──────────────────────────────────────────────────────────

/// A fully materialised query result. `None` cells are SQL NULLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularResult {
  pub columns: Vec<String>,
  pub rows:    Vec<Vec<Option<String>>>,
}

impl TabularResult {
  pub fn row_count(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  /// Serialize column-oriented, keyed by field name and then row index:
  /// `{"name": {"0": "alice", "1": "bob"}}`. This is the field-keyed
  /// structure embedded in the narrator prompt.
  pub fn to_field_keyed_json(&self) -> Value {
    let mut by_column = serde_json::Map::new();
    for (col_idx, col) in self.columns.iter().enumerate() {
      let mut cells = serde_json::Map::new();
      for (row_idx, row) in self.rows.iter().enumerate() {
        let cell = row
          .get(col_idx)
          .and_then(|c| c.as_deref())
          .map(|v| Value::String(v.to_owned()))
          .unwrap_or(Value::Null);
        cells.insert(row_idx.to_string(), cell);
      }
      by_column.insert(col.clone(), Value::Object(cells));
    }
    Value::Object(by_column)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn result() -> TabularResult {
    TabularResult {
      columns: vec!["id".into(), "name".into()],
      rows:    vec![
        vec![Some("1".into()), Some("alice".into())],
        vec![Some("2".into()), None],
      ],
    }
  }

  #[test]
  fn field_keyed_json_is_column_oriented() {
    let json = result().to_field_keyed_json();
    assert_eq!(json["name"]["0"], "alice");
    assert_eq!(json["id"]["1"], "2");
    assert!(json["name"]["1"].is_null());
  }

  #[test]
  fn empty_result_serializes_to_empty_columns() {
    let json = TabularResult { columns: vec!["a".into()], rows: vec![] }
      .to_field_keyed_json();
    assert_eq!(json["a"], serde_json::json!({}));
  }
}
