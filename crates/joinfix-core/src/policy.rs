//! Grouping and duplicate detection over plain join rows.
//!
//! A source relation instance may legitimately link to many documents. It is
//! only corrupt when it links to both the draft and the published row of the
//! same document; the published edge is then the duplicate.

use std::collections::BTreeMap;

use crate::store::JoinRow;

/// Group join rows by the relation instance that owns them.
pub fn group_by_source(rows: Vec<JoinRow>) -> BTreeMap<i64, Vec<JoinRow>> {
  let mut groups: BTreeMap<i64, Vec<JoinRow>> = BTreeMap::new();
  for row in rows {
    groups.entry(row.source_id).or_default().push(row);
  }
  groups
}

/// Join ids to delete from one source group.
///
/// Decisions are made per target document. A document linked through both a
/// draft and a published row loses every published row; a document linked
/// only through rows of one state keeps all of them. Rows without a resolved
/// document id never take part.
pub fn published_duplicates(group: &[JoinRow]) -> Vec<i64> {
  let mut by_document: BTreeMap<&str, Vec<&JoinRow>> = BTreeMap::new();
  for row in group {
    if let Some(document_id) = row.target_document_id.as_deref() {
      by_document.entry(document_id).or_default().push(row);
    }
  }

  by_document
    .into_values()
    .filter(|rows| rows.len() > 1)
    .filter(|rows| {
      rows.iter().any(|r| r.targets_draft()) && rows.iter().any(|r| !r.targets_draft())
    })
    .flat_map(|rows| {
      rows
        .into_iter()
        .filter(|r| !r.targets_draft())
        .map(|r| r.join_id)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn row(join_id: i64, source_id: i64, doc: Option<&str>, published: bool) -> JoinRow {
    JoinRow {
      join_id,
      source_id,
      target_id: join_id * 10,
      target_document_id: doc.map(str::to_owned),
      target_published_at: published.then(|| "2024-01-01T00:00:00Z".to_owned()),
    }
  }

  #[test]
  fn groups_rows_by_source() {
    let groups = group_by_source(vec![
      row(1, 7, Some("a"), false),
      row(2, 8, Some("a"), false),
      row(3, 7, Some("b"), true),
    ]);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[&7].iter().map(|r| r.join_id).collect::<Vec<_>>(), [1, 3]);
    assert_eq!(groups[&8].len(), 1);
  }

  #[test]
  fn draft_and_published_of_same_document_drops_published() {
    let group = [row(1, 1, Some("doc"), false), row(2, 1, Some("doc"), true)];
    assert_eq!(published_duplicates(&group), [2]);
  }

  #[test]
  fn every_published_duplicate_is_dropped() {
    let group = [
      row(1, 1, Some("doc"), true),
      row(2, 1, Some("doc"), false),
      row(3, 1, Some("doc"), true),
    ];
    assert_eq!(published_duplicates(&group), [1, 3]);
  }

  #[test]
  fn single_state_groups_are_left_alone() {
    let drafts = [row(1, 1, Some("doc"), false), row(2, 1, Some("doc"), false)];
    assert!(published_duplicates(&drafts).is_empty());

    let published = [row(1, 1, Some("doc"), true), row(2, 1, Some("doc"), true)];
    assert!(published_duplicates(&published).is_empty());
  }

  #[test]
  fn documents_are_scoped_independently() {
    let group = [
      row(1, 1, Some("a"), false),
      row(2, 1, Some("a"), true),
      row(3, 1, Some("b"), true),
      row(4, 1, Some("c"), false),
      row(5, 1, Some("c"), true),
    ];
    assert_eq!(published_duplicates(&group), [2, 5]);
  }

  #[test]
  fn rows_without_document_are_ignored() {
    let group = [row(1, 1, None, false), row(2, 1, None, true), row(3, 1, Some("a"), true)];
    assert!(published_duplicates(&group).is_empty());
  }
}
