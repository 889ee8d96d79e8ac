//! The repair engine: run a [`Cleaner`] over every unidirectional join table.
//!
//! Every relation is its own failure domain. A relation whose cleanup fails
//! contributes nothing to the total and the run moves on; the engine itself
//! never returns an error.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  cleaner::{Cleaner, DraftDuplicateCleaner},
  schema::{Schema, UnidirectionalRelation},
  store::RelationalStore,
};

// ─── Report ──────────────────────────────────────────────────────────────────

/// Outcome of one repair pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairReport {
  /// Join rows removed across all relations.
  pub removed:   u64,
  pub relations: Vec<RelationReport>,
}

impl RepairReport {
  pub fn failed(&self) -> usize {
    self
      .relations
      .iter()
      .filter(|r| matches!(r.status, RelationStatus::Failed { .. }))
      .count()
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationReport {
  pub source_uid: String,
  pub attribute:  String,
  pub join_table: String,
  pub status:     RelationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RelationStatus {
  Cleaned { removed: u64 },
  /// Declared in metadata but absent from the database.
  MissingTable,
  Failed { reason: String },
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// A single repair pass over one store and schema.
pub struct Repair<'a, S> {
  store:  &'a S,
  schema: &'a Schema,
}

impl<'a, S: RelationalStore> Repair<'a, S> {
  pub fn new(store: &'a S, schema: &'a Schema) -> Self { Self { store, schema } }

  /// Clean every unidirectional relation, in metadata order.
  pub async fn run<C: Cleaner<S>>(&self, cleaner: &C) -> RepairReport {
    let mut report = RepairReport::default();

    for relation in self.schema.unidirectional_relations() {
      let status = match self.clean_relation(cleaner, relation).await {
        Ok(Some(removed)) => {
          report.removed += removed;
          RelationStatus::Cleaned { removed }
        }
        Ok(None) => {
          debug!(table = %relation.join_table.name, "join table missing, skipping");
          RelationStatus::MissingTable
        }
        Err(err) => {
          warn!(
            table = %relation.join_table.name,
            model = %relation.source_model.uid,
            attribute = relation.attribute,
            error = %err,
            "join table cleanup failed"
          );
          RelationStatus::Failed { reason: err.to_string() }
        }
      };

      report.relations.push(RelationReport {
        source_uid: relation.source_model.uid.clone(),
        attribute:  relation.attribute.to_owned(),
        join_table: relation.join_table.name.clone(),
        status,
      });
    }

    info!(
      removed = report.removed,
      relations = report.relations.len(),
      failed = report.failed(),
      "unidirectional join table repair finished"
    );
    report
  }

  /// `None` when the join table does not exist.
  async fn clean_relation<C: Cleaner<S>>(
    &self,
    cleaner: &C,
    relation: UnidirectionalRelation<'_>,
  ) -> Result<Option<u64>> {
    let exists = self
      .store
      .has_table(&relation.join_table.name)
      .await
      .map_err(Error::store)?;
    if !exists {
      return Ok(None);
    }
    cleaner.clean(self.store, self.schema, relation).await.map(Some)
  }
}

/// Run `cleaner` over every unidirectional join table and return the total
/// number of join rows removed.
pub async fn process_unidirectional_join_tables<S, C>(
  store: &S,
  schema: &Schema,
  cleaner: &C,
) -> u64
where
  S: RelationalStore,
  C: Cleaner<S>,
{
  Repair::new(store, schema).run(cleaner).await.removed
}

/// [`process_unidirectional_join_tables`] with the default
/// [`DraftDuplicateCleaner`].
pub async fn repair_unidirectional_join_tables<S: RelationalStore>(
  store: &S,
  schema: &Schema,
) -> u64 {
  process_unidirectional_join_tables(store, schema, &DraftDuplicateCleaner::default()).await
}
