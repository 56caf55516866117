//! Upload decoding: CSV and Excel files into a [`Dataset`].
//!
//! The header row becomes the column set verbatim; every cell value is
//! coerced to text, matching the all-TEXT column layout of the tabular
//! store. Short rows are padded to the header width.

pub mod error;

mod sheet;

pub use error::{Error, Result};
pub use sheet::read_xlsx;

use std::{fs::File, io::Read, path::Path};

use tabletalk_core::dataset::Dataset;

// ─── CSV ─────────────────────────────────────────────────────────────────────

/// Decode CSV from any reader. The first record is the header; an input
/// without a header row is an error, not an empty dataset.
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
  let mut csv_reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .from_reader(reader);

  let columns: Vec<String> = csv_reader
    .headers()?
    .iter()
    .map(str::to_owned)
    .collect();
  if columns.is_empty() || columns.iter().all(String::is_empty) {
    return Err(Error::MissingHeader);
  }

  let width = columns.len();
  let mut rows = Vec::new();
  for record in csv_reader.records() {
    let record = record?;
    let mut row: Vec<String> =
      record.iter().take(width).map(str::to_owned).collect();
    row.resize(width, String::new());
    rows.push(row);
  }

  Ok(Dataset { columns, rows })
}

// ─── Extension dispatch ──────────────────────────────────────────────────────

/// Decode an upload based on its file extension (`csv`, `xlsx`, `xls`).
pub fn read_file(path: impl AsRef<Path>) -> Result<Dataset> {
  let path = path.as_ref();
  let extension = path
    .extension()
    .and_then(|e| e.to_str())
    .map(str::to_ascii_lowercase)
    .unwrap_or_default();

  match extension.as_str() {
    "csv" => read_csv(File::open(path)?),
    "xlsx" | "xls" => read_xlsx(path),
    other => Err(Error::UnsupportedExtension(other.to_owned())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn csv_header_becomes_column_set_verbatim() {
    let data = "id,name\n1,alice\n2,bob\n";
    let dataset = read_csv(data.as_bytes()).unwrap();
    assert_eq!(dataset.columns, ["id", "name"]);
    assert_eq!(dataset.rows.len(), 2);
    assert_eq!(dataset.rows[0], ["1", "alice"]);
    assert_eq!(dataset.rows[1], ["2", "bob"]);
  }

  #[test]
  fn csv_short_rows_are_padded_to_header_width() {
    let data = "a,b,c\n1,2\n";
    let dataset = read_csv(data.as_bytes()).unwrap();
    assert_eq!(dataset.rows[0], ["1", "2", ""]);
  }

  #[test]
  fn csv_long_rows_are_truncated_to_header_width() {
    let data = "a,b\n1,2,3\n";
    let dataset = read_csv(data.as_bytes()).unwrap();
    assert_eq!(dataset.rows[0], ["1", "2"]);
  }

  #[test]
  fn csv_values_stay_textual() {
    let data = "amount\n00042\n";
    let dataset = read_csv(data.as_bytes()).unwrap();
    // Leading zeros survive: nothing is parsed as a number.
    assert_eq!(dataset.rows[0][0], "00042");
  }

  #[test]
  fn empty_csv_is_missing_header() {
    let err = read_csv("".as_bytes()).unwrap_err();
    assert!(matches!(err, Error::MissingHeader));
  }

  #[test]
  fn unknown_extension_is_rejected() {
    let err = read_file("data.parquet").unwrap_err();
    assert!(matches!(err, Error::UnsupportedExtension(ext) if ext == "parquet"));
  }
}
