//! Error types for the upload decoders.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("upload has no header row")]
  MissingHeader,

  #[error("unsupported file extension: {0:?}")]
  UnsupportedExtension(String),

  #[error("workbook contains no worksheets")]
  NoWorksheet,

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("spreadsheet error: {0}")]
  Spreadsheet(#[from] calamine::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
