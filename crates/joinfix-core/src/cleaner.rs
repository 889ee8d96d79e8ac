//! The per-relation cleanup strategy and its default implementation.

use tracing::{debug, info};

use crate::{
  Error, Result,
  owner::{DEFAULT_MAX_COMPONENT_DEPTH, root_supports_draft_and_publish},
  policy::{group_by_source, published_duplicates},
  schema::{Schema, UnidirectionalRelation},
  store::{JoinRowQuery, RelationalStore},
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Cleans one unidirectional join table and reports how many rows it removed.
///
/// The engine calls this once per relation and contains any error it returns,
/// so implementations are free to bail out with `?`.
pub trait Cleaner<S: RelationalStore> {
  async fn clean(
    &self,
    store: &S,
    schema: &Schema,
    relation: UnidirectionalRelation<'_>,
  ) -> Result<u64>;
}

// ─── Default cleaner ─────────────────────────────────────────────────────────

/// Removes join rows pointing at the published row of a document when the
/// same relation instance also points at that document's draft row.
#[derive(Debug, Clone, Copy)]
pub struct DraftDuplicateCleaner {
  /// Count the duplicates without deleting them.
  pub dry_run:             bool,
  pub max_component_depth: usize,
}

impl Default for DraftDuplicateCleaner {
  fn default() -> Self {
    Self { dry_run: false, max_component_depth: DEFAULT_MAX_COMPONENT_DEPTH }
  }
}

impl DraftDuplicateCleaner {
  pub fn with_dry_run(self, dry_run: bool) -> Self { Self { dry_run, ..self } }

  pub fn with_max_component_depth(self, max_component_depth: usize) -> Self {
    Self { max_component_depth, ..self }
  }
}

impl<S: RelationalStore> Cleaner<S> for DraftDuplicateCleaner {
  async fn clean(
    &self,
    store: &S,
    schema: &Schema,
    relation: UnidirectionalRelation<'_>,
  ) -> Result<u64> {
    let table = relation.join_table.name.as_str();

    let Some(target) = schema.model(&relation.relation.target) else {
      debug!(table, target = %relation.relation.target, "unknown target model, skipping");
      return Ok(0);
    };
    if !schema.supports_draft_and_publish(&target.uid) {
      return Ok(0);
    }

    let query = JoinRowQuery::new(relation.join_table, target);
    let rows = store.load_join_rows(&query).await.map_err(Error::store)?;

    let mut to_delete = Vec::new();
    for (source_id, group) in group_by_source(rows) {
      if group.len() <= 1 {
        continue;
      }
      // Cheaper than the owner walk, and an empty result makes it moot.
      let duplicates = published_duplicates(&group);
      if duplicates.is_empty() {
        continue;
      }

      let supported = root_supports_draft_and_publish(
        store,
        schema,
        relation.source_model,
        source_id,
        self.max_component_depth,
      )
      .await
      .unwrap_or_else(|err| {
        debug!(table, source_id, error = %err, "could not resolve owner");
        false
      });

      if supported {
        to_delete.extend(duplicates);
      } else {
        debug!(table, source_id, "owner lacks draft/publish, keeping group");
      }
    }

    if to_delete.is_empty() {
      return Ok(0);
    }
    if self.dry_run {
      info!(table, rows = to_delete.len(), "dry run: would remove duplicate join rows");
      return Ok(to_delete.len() as u64);
    }

    let removed = store
      .delete_join_rows(table, &to_delete)
      .await
      .map_err(Error::store)?;
    debug!(table, removed, "removed duplicate join rows");
    Ok(removed)
  }
}
