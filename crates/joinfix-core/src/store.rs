//! The `RelationalStore` trait and the row/query types it exchanges.
//!
//! The trait is implemented by storage backends (e.g. `joinfix-store-sqlite`).
//! The repair engine only ever talks to this abstraction, never to SQL
//! directly.

use std::future::Future;

use crate::metadata::{
  ComponentLink, DOCUMENT_ID_COLUMN, ID_COLUMN, JoinTable, ModelMetadata,
  PUBLISHED_AT_COLUMN,
};

// ─── Rows ────────────────────────────────────────────────────────────────────

/// One edge of a join table, enriched with the versioning columns of the row
/// it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRow {
  pub join_id:             i64,
  pub source_id:           i64,
  pub target_id:           i64,
  /// `None` when the target row is gone or carries no document id.
  pub target_document_id:  Option<String>,
  /// Raw `published_at` value of the target; `None` means draft.
  pub target_published_at: Option<String>,
}

impl JoinRow {
  pub fn targets_draft(&self) -> bool { self.target_published_at.is_none() }
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// Parameters for [`RelationalStore::load_join_rows`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRowQuery {
  pub join_table:          String,
  pub id_column:           String,
  pub source_column:       String,
  pub target_column:       String,
  pub target_table:        String,
  /// Column of the target table the join table's target column references.
  pub target_key_column:   String,
  pub document_id_column:  String,
  pub published_at_column: String,
}

impl JoinRowQuery {
  pub fn new(join_table: &JoinTable, target: &ModelMetadata) -> Self {
    Self {
      join_table:          join_table.name.clone(),
      id_column:           ID_COLUMN.to_owned(),
      source_column:       join_table.join_column.name.clone(),
      target_column:       join_table.inverse_join_column.name.clone(),
      target_table:        target.table_name.clone(),
      target_key_column:   join_table.inverse_join_column.referenced_column.clone(),
      document_id_column:  DOCUMENT_ID_COLUMN.to_owned(),
      published_at_column: PUBLISHED_AT_COLUMN.to_owned(),
    }
  }
}

/// Parameters for [`RelationalStore::find_component_owners`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentOwnerQuery {
  pub link:          ComponentLink,
  pub component_uid: String,
  pub component_id:  i64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the relational backend the repair runs against.
///
/// All methods return `Send` futures so the engine can run inside a
/// multi-threaded async runtime.
pub trait RelationalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Whether `table` exists. Join tables declared in metadata may not have
  /// been created yet.
  fn has_table<'a>(
    &'a self,
    table: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Every join row of `query.join_table`, left-joined with the target table.
  /// Rows with a `NULL` source or target column are not returned.
  fn load_join_rows<'a>(
    &'a self,
    query: &'a JoinRowQuery,
  ) -> impl Future<Output = Result<Vec<JoinRow>, Self::Error>> + Send + 'a;

  /// The ids of the owner rows that embed the given component instance.
  fn find_component_owners<'a>(
    &'a self,
    query: &'a ComponentOwnerQuery,
  ) -> impl Future<Output = Result<Vec<i64>, Self::Error>> + Send + 'a;

  /// Delete exactly the join rows in `ids` and return how many were removed.
  /// An empty `ids` slice is a no-op.
  fn delete_join_rows<'a>(
    &'a self,
    table: &'a str,
    ids: &'a [i64],
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;
}
