pub mod catalog;
pub use catalog::{BaseType, Catalog, CatalogError, CatalogField, Humanizer, MemoryCatalog, SimpleHumanizer};

pub mod parser;
pub use parser::{analyzer::{AnnotateError, AnnotateResult, ColumnMetadata, ColumnSource}, ast::Query, ParseError};

pub mod annotator;
pub use annotator::{AnnotateConfig, AnnotatedResult, Annotator, ExecutionResult, QueryRunner, RawColumn};
