//! Relational metadata for models, components and their relations.
//!
//! These types mirror the metadata registry of the content store: every model
//! maps to one table, and relation attributes that need a join table describe
//! its name and columns. All types deserialise from the camelCase JSON the
//! registry exports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Primary key column of every model table and every join table.
pub const ID_COLUMN: &str = "id";
/// Column shared by the draft and published rows of one document.
pub const DOCUMENT_ID_COLUMN: &str = "document_id";
/// `NULL` on draft rows, set on published rows.
pub const PUBLISHED_AT_COLUMN: &str = "published_at";

// ─── Models ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModelKind {
  ContentType,
  Component,
}

/// One content type or component and the table backing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
  pub uid:               String,
  pub kind:              ModelKind,
  pub table_name:        String,
  /// Only meaningful for content types; components never version on their own.
  #[serde(default)]
  pub draft_and_publish: bool,
  #[serde(default)]
  pub attributes:        BTreeMap<String, Attribute>,
}

impl ModelMetadata {
  pub fn is_component(&self) -> bool { self.kind == ModelKind::Component }

  /// The table linking rows of this model to the component instances they
  /// embed.
  pub fn component_link(&self) -> ComponentLink {
    ComponentLink::for_table(&self.table_name)
  }

  /// Iterate the relation attributes declared on this model.
  pub fn relations(&self) -> impl Iterator<Item = (&str, &RelationAttribute)> {
    self.attributes.iter().filter_map(|(name, attr)| match attr {
      Attribute::Relation(rel) => Some((name.as_str(), rel)),
      _ => None,
    })
  }

  /// Whether this model embeds `component_uid`, directly or through a
  /// dynamic zone.
  pub fn embeds(&self, component_uid: &str) -> bool {
    self.attributes.values().any(|attr| match attr {
      Attribute::Component { component, .. } => component == component_uid,
      Attribute::DynamicZone { components } => {
        components.iter().any(|c| c == component_uid)
      }
      _ => false,
    })
  }
}

// ─── Attributes ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Attribute {
  Relation(RelationAttribute),
  Component {
    component:  String,
    #[serde(default)]
    repeatable: bool,
  },
  #[serde(rename = "dynamiczone")]
  DynamicZone { components: Vec<String> },
  /// Scalar and media attributes; irrelevant to join-table repair.
  #[serde(other)]
  Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
  OneToOne,
  OneToMany,
  ManyToOne,
  ManyToMany,
  MorphToOne,
  MorphToMany,
  MorphOne,
  MorphMany,
}

impl RelationKind {
  pub fn is_morph(self) -> bool {
    matches!(
      self,
      Self::MorphToOne | Self::MorphToMany | Self::MorphOne | Self::MorphMany
    )
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationAttribute {
  pub relation:    RelationKind,
  pub target:      String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub join_table:  Option<JoinTable>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub inversed_by: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mapped_by:   Option<String>,
}

impl RelationAttribute {
  /// Only one side declares the relation; no inverse attribute exists.
  pub fn is_unidirectional(&self) -> bool {
    self.inversed_by.is_none() && self.mapped_by.is_none()
  }

  /// The join table this relation owns, if it is a repair candidate.
  pub fn repairable_join_table(&self) -> Option<&JoinTable> {
    if self.relation.is_morph() || !self.is_unidirectional() {
      return None;
    }
    self.join_table.as_ref()
  }
}

// ─── Join tables ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTable {
  pub name:                      String,
  /// Points back at the owning (source) row.
  pub join_column:               JoinColumn,
  /// Points at the related (target) row.
  pub inverse_join_column:       JoinColumn,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub order_column_name:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub inverse_order_column_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinColumn {
  pub name:              String,
  #[serde(default = "default_referenced_column")]
  pub referenced_column: String,
}

impl JoinColumn {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), referenced_column: default_referenced_column() }
  }
}

fn default_referenced_column() -> String { ID_COLUMN.to_owned() }

// ─── Component links ─────────────────────────────────────────────────────────

/// The `<table>_cmps` table linking owner rows to embedded component rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentLink {
  pub table:            String,
  pub entity_column:    &'static str,
  pub component_column: &'static str,
  pub type_column:      &'static str,
}

impl ComponentLink {
  pub fn for_table(owner_table: &str) -> Self {
    Self {
      table:            format!("{owner_table}_cmps"),
      entity_column:    "entity_id",
      component_column: "cmp_id",
      type_column:      "component_type",
    }
  }
}
