//! [`SqliteStore`] — the SQLite implementation of [`RelationalStore`].

use std::path::Path;

use joinfix_core::{
  metadata::ID_COLUMN,
  store::{ComponentOwnerQuery, JoinRow, JoinRowQuery, RelationalStore},
};
use rusqlite::{OpenFlags, OptionalExtension as _};

use crate::{
  Result,
  sql::{
    DELETE_CHUNK_SIZE, delete_by_ids, nullable_text, select_component_owners,
    select_join_rows,
  },
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A content database reached through a single SQLite connection.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open an existing database file at `path`. A missing file is an error,
  /// never an empty database.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
      | OpenFlags::SQLITE_OPEN_URI
      | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = tokio_rusqlite::Connection::open_with_flags(path, flags).await?;
    Ok(Self { conn })
  }

  /// Open an in-memory database — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self { conn })
  }
}

// ─── RelationalStore impl ────────────────────────────────────────────────────

impl RelationalStore for SqliteStore {
  type Error = crate::Error;

  async fn has_table(&self, table: &str) -> Result<bool> {
    let table = table.to_owned();

    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
              rusqlite::params![table],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(exists)
  }

  async fn load_join_rows(&self, query: &JoinRowQuery) -> Result<Vec<JoinRow>> {
    let sql = select_join_rows(query);

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| {
            Ok(JoinRow {
              join_id:             row.get(0)?,
              source_id:           row.get(1)?,
              target_id:           row.get(2)?,
              target_document_id:  nullable_text(row.get_ref(3)?),
              target_published_at: nullable_text(row.get_ref(4)?),
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows)
  }

  async fn find_component_owners(&self, query: &ComponentOwnerQuery) -> Result<Vec<i64>> {
    let sql           = select_component_owners(query);
    let component_id  = query.component_id;
    let component_uid = query.component_uid.clone();

    let owners = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let owners = stmt
          .query_map(rusqlite::params![component_id, component_uid], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(owners)
      })
      .await?;

    Ok(owners)
  }

  async fn delete_join_rows(&self, table: &str, ids: &[i64]) -> Result<u64> {
    if ids.is_empty() {
      return Ok(0);
    }
    let table = table.to_owned();
    let ids   = ids.to_vec();

    let removed = self
      .conn
      .call(move |conn| {
        // One transaction per relation; chunks keep each statement under the
        // parameter limit.
        let tx = conn.transaction()?;
        let mut removed = 0_u64;
        for chunk in ids.chunks(DELETE_CHUNK_SIZE) {
          let sql = delete_by_ids(&table, ID_COLUMN, chunk.len());
          removed += tx.execute(&sql, rusqlite::params_from_iter(chunk))? as u64;
        }
        tx.commit()?;
        Ok(removed)
      })
      .await?;

    Ok(removed)
  }
}
