//! Resolve whether the entity ultimately owning a row supports draft/publish.
//!
//! Component rows have no versioning of their own; they inherit it from the
//! content type they are embedded in, possibly through several levels of
//! component nesting. The walk goes upward one level at a time through the
//! owners' `<table>_cmps` link tables.

use std::collections::BTreeSet;

use tracing::debug;

use crate::{
  Error, Result,
  metadata::{ModelKind, ModelMetadata},
  schema::Schema,
  store::{ComponentOwnerQuery, RelationalStore},
};

/// Nesting deeper than this is treated as corrupt metadata.
pub const DEFAULT_MAX_COMPONENT_DEPTH: usize = 8;

/// Walk from `(model, row_id)` up to the content type rows owning it.
///
/// Returns `true` only when at least one content type root was reached and
/// every root reached supports draft/publish. An orphaned component instance
/// yields `false`.
pub async fn root_supports_draft_and_publish<S: RelationalStore>(
  store:     &S,
  schema:    &Schema,
  model:     &ModelMetadata,
  row_id:    i64,
  max_depth: usize,
) -> Result<bool> {
  if model.kind == ModelKind::ContentType {
    return Ok(schema.supports_draft_and_publish(&model.uid));
  }

  let mut visited: BTreeSet<(String, i64)> = BTreeSet::new();
  let mut frontier = vec![(model.uid.clone(), row_id)];
  let mut reached_root = false;

  for _ in 0..=max_depth {
    let mut next = Vec::new();

    for (uid, id) in frontier {
      if !visited.insert((uid.clone(), id)) {
        continue;
      }
      let current = schema
        .model(&uid)
        .ok_or_else(|| Error::UnknownModel(uid.clone()))?;

      if !current.is_component() {
        if !schema.supports_draft_and_publish(&uid) {
          debug!(root = %uid, id, "owner does not support draft/publish");
          return Ok(false);
        }
        reached_root = true;
        continue;
      }

      let owners = component_owners(store, schema, current, id).await?;
      if owners.is_empty() {
        debug!(component = %uid, id, "component instance has no owner");
        return Ok(false);
      }
      next.extend(owners);
    }

    if next.is_empty() {
      return Ok(reached_root);
    }
    frontier = next;
  }

  Err(Error::ComponentDepthExceeded { uid: model.uid.clone(), max_depth })
}

/// Every `(owner uid, owner row id)` embedding one component instance.
async fn component_owners<S: RelationalStore>(
  store:     &S,
  schema:    &Schema,
  component: &ModelMetadata,
  id:        i64,
) -> Result<Vec<(String, i64)>> {
  let mut owners = Vec::new();

  for parent in schema.component_parents(&component.uid) {
    let link = parent.component_link();
    if !store.has_table(&link.table).await.map_err(Error::store)? {
      continue;
    }

    let query = ComponentOwnerQuery {
      link,
      component_uid: component.uid.clone(),
      component_id: id,
    };
    let ids = store
      .find_component_owners(&query)
      .await
      .map_err(Error::store)?;
    owners.extend(ids.into_iter().map(|owner_id| (parent.uid.clone(), owner_id)));
  }

  Ok(owners)
}
