use indexmap::IndexMap;

use crate::catalog::{Catalog, CatalogError, CatalogField};

/// In-memory [`Catalog`] keyed by field id.
///
/// Handy for embedding a fixed set of fields and for tests; production callers
/// usually wrap their own metadata store behind the trait instead.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    fields: IndexMap<i64, CatalogField>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: CatalogField) {
        self.fields.insert(field.id, field);
    }

    pub fn with_field(mut self, field: CatalogField) -> Self {
        self.insert(field);
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Catalog for MemoryCatalog {
    fn field(&self, id: i64) -> Result<CatalogField, CatalogError> {
        self.fields.get(&id).cloned().ok_or(CatalogError::NotFound(id))
    }
}
