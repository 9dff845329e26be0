pub mod annotate_error;
pub use annotate_error::*;

pub mod column_metadata;
pub use column_metadata::*;

pub mod ident;
pub use ident::*;

pub mod name_dedup;
pub use name_dedup::*;

pub mod resolve_context;
pub use resolve_context::*;

pub mod type_inference;
pub use type_inference::*;

pub mod stage_columns;
pub use stage_columns::*;

pub mod resolvers;
pub use resolvers::*;
