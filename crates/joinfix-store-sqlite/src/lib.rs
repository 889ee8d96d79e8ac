//! SQLite backend for the join-table repair engine.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod sql;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
