pub mod field_ref_resolver;
pub use field_ref_resolver::*;

pub mod join_resolver;
pub use join_resolver::*;

pub mod expression_resolver;
pub use expression_resolver::*;

pub mod aggregate_resolver;
pub use aggregate_resolver::*;

pub mod ref_key;
pub use ref_key::*;
