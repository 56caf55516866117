//! Error type for `tabletalk-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sql error: {0}")]
  Sql(#[from] rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("timestamp parse error: {0}")]
  TimestampParse(String),

  /// The managed relation does not exist — no dataset has been uploaded.
  #[error("no dataset has been uploaded yet")]
  NoDataset,

  /// An upload with zero columns cannot form a relation.
  #[error("dataset has no columns")]
  EmptyHeader,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
