//! Plain-text result tables for the terminal.

use tabletalk_core::dataset::TabularResult;

const NULL_CELL: &str = "NULL";

/// Render a result as a fixed-width table with a header rule. Column
/// widths fit the widest cell; NULLs print as `NULL`.
pub fn render(result: &TabularResult) -> String {
  let mut widths: Vec<usize> =
    result.columns.iter().map(String::len).collect();
  for row in &result.rows {
    for (i, cell) in row.iter().enumerate() {
      let len = cell.as_deref().unwrap_or(NULL_CELL).len();
      if len > widths[i] {
        widths[i] = len;
      }
    }
  }

  let mut out = String::new();
  push_row(&mut out, &widths, result.columns.iter().map(String::as_str));
  push_rule(&mut out, &widths);
  for row in &result.rows {
    push_row(
      &mut out,
      &widths,
      row.iter().map(|cell| cell.as_deref().unwrap_or(NULL_CELL)),
    );
  }
  out
}

fn push_row<'a>(
  out: &mut String,
  widths: &[usize],
  cells: impl Iterator<Item = &'a str>,
) {
  let line = cells
    .zip(widths.iter().copied())
    .map(|(cell, width)| format!("{cell:<width$}"))
    .collect::<Vec<_>>()
    .join("  ");
  out.push_str(line.trim_end());
  out.push('\n');
}

fn push_rule(out: &mut String, widths: &[usize]) {
  let line = widths
    .iter()
    .map(|w| "-".repeat(*w))
    .collect::<Vec<_>>()
    .join("  ");
  out.push_str(&line);
  out.push('\n');
}
