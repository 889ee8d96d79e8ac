//! SQL text for the statements the store issues.
//!
//! Table and column names come from schema metadata, so every identifier is
//! quoted. Values are always bound as parameters.

use joinfix_core::store::{ComponentOwnerQuery, JoinRowQuery};
use rusqlite::types::ValueRef;

/// Ids per `DELETE … WHERE id IN (…)` statement, well below SQLite's
/// bound-parameter limit.
pub const DELETE_CHUNK_SIZE: usize = 500;

/// Quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String { format!("\"{}\"", name.replace('"', "\"\"")) }

/// `?, ?, …` with `n` placeholders.
pub fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }

pub fn select_join_rows(q: &JoinRowQuery) -> String {
  let jt = quote_ident(&q.join_table);
  let id = quote_ident(&q.id_column);
  let src = quote_ident(&q.source_column);
  let tgt = quote_ident(&q.target_column);
  let target = quote_ident(&q.target_table);
  let key = quote_ident(&q.target_key_column);
  let doc = quote_ident(&q.document_id_column);
  let published = quote_ident(&q.published_at_column);

  format!(
    "SELECT jt.{id}, jt.{src}, jt.{tgt}, t.{doc}, t.{published}
     FROM {jt} AS jt
     LEFT JOIN {target} AS t ON jt.{tgt} = t.{key}
     WHERE jt.{src} IS NOT NULL
       AND jt.{tgt} IS NOT NULL
     ORDER BY jt.{id}"
  )
}

pub fn select_component_owners(q: &ComponentOwnerQuery) -> String {
  format!(
    "SELECT DISTINCT {entity} FROM {table} WHERE {cmp} = ?1 AND {ty} = ?2 ORDER BY {entity}",
    entity = quote_ident(q.link.entity_column),
    table = quote_ident(&q.link.table),
    cmp = quote_ident(q.link.component_column),
    ty = quote_ident(q.link.type_column),
  )
}

pub fn delete_by_ids(table: &str, id_column: &str, n: usize) -> String {
  format!(
    "DELETE FROM {} WHERE {} IN ({})",
    quote_ident(table),
    quote_ident(id_column),
    placeholders(n)
  )
}

/// Text form of a nullable column. Timestamps may be stored as text or as
/// epoch numbers; only `NULL` versus non-`NULL` matters to callers.
pub fn nullable_text(value: ValueRef<'_>) -> Option<String> {
  match value {
    ValueRef::Null => None,
    ValueRef::Integer(i) => Some(i.to_string()),
    ValueRef::Real(f) => Some(f.to_string()),
    ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
  }
}
