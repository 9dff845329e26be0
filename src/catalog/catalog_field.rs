use serde::{Deserialize, Serialize};

use crate::catalog::BaseType;

/// Static metadata for one catalog field, as returned by a [`Catalog`](crate::catalog::Catalog).
///
/// - `parent_id` is set for nested (compound) fields; the resolver composes
///   the parent's name in front of this field's name.
/// - `ident` is the field's stable identity token, when the catalog has one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogField {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub base_type: BaseType,
    #[serde(default)]
    pub effective_type: Option<BaseType>,
    #[serde(default)]
    pub coercion_strategy: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub ident: Option<String>,
}

impl CatalogField {
    pub fn new(id: i64, name: &str, display_name: &str, base_type: BaseType) -> Self {
        Self {
            id,
            name: name.to_string(),
            display_name: display_name.to_string(),
            base_type,
            effective_type: None,
            coercion_strategy: None,
            parent_id: None,
            ident: None,
        }
    }

    pub fn with_ident(mut self, ident: &str) -> Self {
        self.ident = Some(ident.to_string());
        self
    }

    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Coerced fields report a different effective type than their storage type.
    pub fn with_coercion(mut self, strategy: &str, effective_type: BaseType) -> Self {
        self.coercion_strategy = Some(strategy.to_string());
        self.effective_type = Some(effective_type);
        self
    }
}
