//! [`Schema`] — the metadata and content-type registry consumed by the
//! repair engine.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{
  Result,
  metadata::{JoinTable, ModelKind, ModelMetadata, RelationAttribute},
};

/// All models known to the content store, keyed by uid.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "SchemaFile")]
pub struct Schema {
  models: BTreeMap<String, ModelMetadata>,
}

/// On-disk shape of an exported schema.
#[derive(Deserialize)]
struct SchemaFile {
  models: Vec<ModelMetadata>,
}

impl From<SchemaFile> for Schema {
  fn from(file: SchemaFile) -> Self { Self::new(file.models) }
}

/// A relation attribute that owns a join table with no inverse side.
#[derive(Debug, Clone, Copy)]
pub struct UnidirectionalRelation<'a> {
  pub source_model: &'a ModelMetadata,
  pub attribute:    &'a str,
  pub relation:     &'a RelationAttribute,
  pub join_table:   &'a JoinTable,
}

impl Schema {
  pub fn new(models: impl IntoIterator<Item = ModelMetadata>) -> Self {
    Self {
      models: models.into_iter().map(|m| (m.uid.clone(), m)).collect(),
    }
  }

  /// Parse the JSON export of the metadata registry.
  pub fn from_json(raw: &str) -> Result<Self> { Ok(serde_json::from_str(raw)?) }

  pub fn model(&self, uid: &str) -> Option<&ModelMetadata> { self.models.get(uid) }

  pub fn models(&self) -> impl Iterator<Item = &ModelMetadata> { self.models.values() }

  pub fn relation(&self, uid: &str, attribute: &str) -> Option<&RelationAttribute> {
    self
      .model(uid)?
      .relations()
      .find_map(|(name, rel)| (name == attribute).then_some(rel))
  }

  /// Content types opt into draft/publish; components and unknown models
  /// never support it.
  pub fn supports_draft_and_publish(&self, uid: &str) -> bool {
    self
      .model(uid)
      .is_some_and(|m| m.kind == ModelKind::ContentType && m.draft_and_publish)
  }

  /// Every model embedding `component_uid`, including other components.
  pub fn component_parents<'a>(
    &'a self,
    component_uid: &'a str,
  ) -> impl Iterator<Item = &'a ModelMetadata> + 'a {
    self.models().filter(move |m| m.embeds(component_uid))
  }

  /// Every repairable relation, ordered by (model uid, attribute name).
  pub fn unidirectional_relations(&self) -> Vec<UnidirectionalRelation<'_>> {
    self
      .models()
      .flat_map(|model| {
        model.relations().filter_map(move |(attribute, relation)| {
          relation.repairable_join_table().map(|join_table| UnidirectionalRelation {
            source_model: model,
            attribute,
            relation,
            join_table,
          })
        })
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const SCHEMA_JSON: &str = r#"{
    "models": [
      {
        "uid": "api::product.product",
        "kind": "contentType",
        "tableName": "products",
        "draftAndPublish": true,
        "attributes": {
          "name": { "type": "string", "required": true },
          "compo": { "type": "component", "component": "default.compo" },
          "blocks": { "type": "dynamiczone", "components": ["default.outer"] },
          "tags": {
            "type": "relation",
            "relation": "manyToMany",
            "target": "api::tag.tag",
            "joinTable": {
              "name": "products_tags_lnk",
              "joinColumn": { "name": "product_id" },
              "inverseJoinColumn": { "name": "tag_id" },
              "orderColumnName": "tag_ord"
            }
          },
          "owner": {
            "type": "relation",
            "relation": "manyToOne",
            "target": "api::shop.shop",
            "inversedBy": "products",
            "joinTable": {
              "name": "products_owner_lnk",
              "joinColumn": { "name": "product_id" },
              "inverseJoinColumn": { "name": "shop_id" }
            }
          },
          "related": {
            "type": "relation",
            "relation": "morphToMany",
            "target": "api::tag.tag",
            "joinTable": {
              "name": "products_related_mph",
              "joinColumn": { "name": "product_id" },
              "inverseJoinColumn": { "name": "related_id" }
            }
          }
        }
      },
      {
        "uid": "api::tag.tag",
        "kind": "contentType",
        "tableName": "tags",
        "draftAndPublish": true
      },
      {
        "uid": "default.compo",
        "kind": "component",
        "tableName": "components_default_compos",
        "draftAndPublish": true
      },
      {
        "uid": "default.outer",
        "kind": "component",
        "tableName": "components_default_outers",
        "attributes": {
          "inner": { "type": "component", "component": "default.compo", "repeatable": true }
        }
      }
    ]
  }"#;

  fn schema() -> Schema { Schema::from_json(SCHEMA_JSON).expect("valid schema") }

  #[test]
  fn parses_models_and_attributes() {
    let s = schema();
    let product = s.model("api::product.product").unwrap();
    assert_eq!(product.table_name, "products");
    assert_eq!(product.attributes.len(), 6);

    let tags = s.relation("api::product.product", "tags").unwrap();
    let jt = tags.join_table.as_ref().unwrap();
    assert_eq!(jt.join_column.name, "product_id");
    assert_eq!(jt.inverse_join_column.referenced_column, "id");
    assert_eq!(jt.order_column_name.as_deref(), Some("tag_ord"));
  }

  #[test]
  fn draft_and_publish_only_applies_to_content_types() {
    let s = schema();
    assert!(s.supports_draft_and_publish("api::product.product"));
    assert!(!s.supports_draft_and_publish("default.compo"));
    assert!(!s.supports_draft_and_publish("api::missing.missing"));
  }

  #[test]
  fn component_parents_follow_components_and_dynamic_zones() {
    let s = schema();

    let compo_parents: Vec<_> =
      s.component_parents("default.compo").map(|m| m.uid.as_str()).collect();
    assert_eq!(compo_parents, ["api::product.product", "default.outer"]);

    let outer_parents: Vec<_> =
      s.component_parents("default.outer").map(|m| m.uid.as_str()).collect();
    assert_eq!(outer_parents, ["api::product.product"]);
  }

  #[test]
  fn unidirectional_relations_skip_inverse_and_morph_sides() {
    let s = schema();
    let relations = s.unidirectional_relations();
    assert_eq!(relations.len(), 1);
    assert_eq!(relations[0].attribute, "tags");
    assert_eq!(relations[0].join_table.name, "products_tags_lnk");
    assert_eq!(relations[0].source_model.uid, "api::product.product");
  }

  #[test]
  fn component_link_table_name() {
    let s = schema();
    let link = s.model("default.outer").unwrap().component_link();
    assert_eq!(link.table, "components_default_outers_cmps");
    assert_eq!(link.component_column, "cmp_id");
  }
}
