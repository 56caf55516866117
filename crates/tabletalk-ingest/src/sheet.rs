//! Excel workbook decoding via `calamine`.
//!
//! Only the first worksheet is read — the system manages exactly one
//! relation at a time.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tabletalk_core::dataset::Dataset;

use crate::{Error, Result};

/// Decode the first worksheet of an `.xlsx`/`.xls` workbook.
pub fn read_xlsx(path: impl AsRef<Path>) -> Result<Dataset> {
  let mut workbook = open_workbook_auto(path)?;
  let range = workbook
    .worksheet_range_at(0)
    .ok_or(Error::NoWorksheet)??;

  let mut rows_iter = range.rows();
  let header = rows_iter.next().ok_or(Error::MissingHeader)?;

  let columns: Vec<String> = header.iter().map(cell_to_text).collect();
  if columns.is_empty() || columns.iter().all(String::is_empty) {
    return Err(Error::MissingHeader);
  }

  let width = columns.len();
  let rows = rows_iter
    .map(|row| {
      let mut cells: Vec<String> =
        row.iter().take(width).map(cell_to_text).collect();
      cells.resize(width, String::new());
      cells
    })
    .collect();

  Ok(Dataset { columns, rows })
}

/// Coerce one spreadsheet cell to text. Whole-number floats print without
/// the trailing `.0` Excel would otherwise leak into every integer column.
fn cell_to_text(cell: &Data) -> String {
  match cell {
    Data::Empty => String::new(),
    Data::String(s) => s.clone(),
    Data::Int(i) => i.to_string(),
    Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
      format!("{}", *f as i64)
    }
    Data::Float(f) => f.to_string(),
    Data::Bool(b) => b.to_string(),
    Data::DateTime(dt) => dt.as_f64().to_string(),
    Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    Data::Error(e) => format!("#ERR:{e:?}"),
  }
}
