//! SQLite backends for the TableTalk stores.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The tabular store and the
//! history store each hold their own connection; they may share one
//! database file. Their lifetimes differ: the dataset is replaced
//! wholesale on upload, the history log only ever grows.

mod encode;
mod history;
mod schema;
mod tabular;

pub mod error;

pub use error::{Error, Result};
pub use history::SqliteHistoryStore;
pub use tabular::SqliteTabularStore;
