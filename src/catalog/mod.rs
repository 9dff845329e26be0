use thiserror::Error;

pub mod base_type;
pub use base_type::*;

pub mod catalog_field;
pub use catalog_field::*;

pub mod memory_catalog;
pub use memory_catalog::*;

pub mod humanize;
pub use humanize::*;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("field {0} not found in catalog")]
    NotFound(i64),
}

/// Static field metadata store.
pub trait Catalog {
    /// Look up a field by its stable numeric id.
    fn field(&self, id: i64) -> Result<CatalogField, CatalogError>;
}
