use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    catalog::{BaseType, CatalogField},
    parser::ast::{Binning, ColumnRef, TemporalUnit},
};

/// Which structural part of a stage produced a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnSource {
    Breakout,
    Aggregation,
    Fields,
    Native,
}

/// Descriptor of one result column.
///
/// Within one emitted list `name` is unique. `field_ref` re-selects the column
/// from the stage that produced it, and `ident` is its stable identity token.
/// Keys a driver returned that this crate does not model are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMetadata {
    pub name: String,
    pub display_name: String,
    pub base_type: BaseType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_type: Option<BaseType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coercion_strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ColumnSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_ref: Option<ColumnRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ident: Option<String>,
    /// catalog field id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fk_field_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binning_info: Option<Binning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<TemporalUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_name: Option<String>,
    /// stage-internal ref options recorded by earlier processing
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub options: IndexMap<String, Value>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl ColumnMetadata {
    pub fn new(name: &str, display_name: &str, base_type: BaseType) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            base_type,
            ..Self::default()
        }
    }

    pub fn from_catalog(field: &CatalogField) -> Self {
        Self {
            name: field.name.clone(),
            display_name: field.display_name.clone(),
            base_type: field.base_type,
            effective_type: field.effective_type,
            coercion_strategy: field.coercion_strategy.clone(),
            ident: field.ident.clone(),
            id: Some(field.id),
            ..Self::default()
        }
    }

    pub fn with_field_ref(mut self, field_ref: ColumnRef) -> Self {
        self.field_ref = Some(field_ref);
        self
    }

    pub fn with_ident(mut self, ident: &str) -> Self {
        self.ident = Some(ident.to_string());
        self
    }

    pub fn with_source(mut self, source: ColumnSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Breakout and aggregation columns own their identity at their stage.
    pub fn owns_ident(&self) -> bool {
        matches!(self.source, Some(ColumnSource::Breakout | ColumnSource::Aggregation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::FieldRef;
    use serde_json::json;

    #[test]
    fn serializes_snake_case_and_skips_absent_facts() {
        let col = ColumnMetadata::new("total", "Total", BaseType::Float)
            .with_source(ColumnSource::Fields)
            .with_field_ref(ColumnRef::Field(FieldRef::by_id(5)));
        assert_eq!(
            serde_json::to_value(&col).unwrap(),
            json!({
                "name": "total",
                "display_name": "Total",
                "base_type": "type/Float",
                "source": "fields",
                "field_ref": ["field", 5, null],
            })
        );
    }

    #[test]
    fn unknown_keys_land_in_extra() {
        let col: ColumnMetadata = serde_json::from_value(json!({
            "name": "n",
            "display_name": "N",
            "base_type": "type/Text",
            "semantic_type": "type/Name",
        }))
        .unwrap();
        assert_eq!(col.extra.get("semantic_type"), Some(&json!("type/Name")));
        assert_eq!(col.base_type, BaseType::Text);
    }
}
