//! The `TabularStore` and `HistoryStore` traits.
//!
//! The traits are implemented by storage backends (e.g.
//! `tabletalk-store-sqlite`). Higher layers (`tabletalk-engine`,
//! `tabletalk-cli`) depend on these abstractions, not on any concrete
//! backend.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes.

use std::future::Future;

use uuid::Uuid;

use crate::{
  dataset::{Dataset, TableSchema, TabularResult},
  history::{HistoryRecord, NewHistoryRecord},
};

// ─── Tabular store ───────────────────────────────────────────────────────────

/// Abstraction over the store that holds the single managed relation.
///
/// The relation is replaced wholesale on upload (drop-and-recreate). Query
/// execution is read-only by convention, not enforcement: the synthesized
/// SQL is executed as-is, and any backend error is reported through
/// `Self::Error` rather than propagated raw.
pub trait TabularStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Drop the managed relation (if present) and recreate it from `dataset`,
  /// with every column declared TEXT.
  fn replace_dataset(
    &self,
    dataset: Dataset,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Read live column metadata for the managed relation.
  ///
  /// Errors if no dataset has been uploaded yet — callers treat "no
  /// dataset" as a distinct precondition, not an empty schema.
  fn inspect_schema(
    &self,
  ) -> impl Future<Output = Result<TableSchema, Self::Error>> + Send + '_;

  /// Run one SQL statement and materialise all result rows.
  fn execute<'a>(
    &'a self,
    sql: &'a str,
  ) -> impl Future<Output = Result<TabularResult, Self::Error>> + Send + 'a;
}

// ─── History store ───────────────────────────────────────────────────────────

/// Abstraction over the append-only chat-history log.
pub trait HistoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist one completed turn. The record id and timestamp are assigned
  /// by the store.
  fn append(
    &self,
    record: NewHistoryRecord,
  ) -> impl Future<Output = Result<HistoryRecord, Self::Error>> + Send + '_;

  /// All records for a session, ordered by timestamp ascending.
  fn load_session(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Vec<HistoryRecord>, Self::Error>> + Send + '_;

  /// Distinct session ids, most recently active first.
  fn session_ids(
    &self,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  /// Remove all records for `session_id`; returns the number removed.
  /// Records belonging to other sessions are never touched.
  fn delete_session(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
