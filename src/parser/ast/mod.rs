pub mod literal;
pub use literal::*;

pub mod temporal_unit;
pub use temporal_unit::*;

pub mod binning;
pub use binning::*;

pub mod field_ref;
pub use field_ref::*;

pub mod column_ref;
pub use column_ref::*;

pub mod clause;
pub use clause::*;

pub mod aggregation;
pub use aggregation::*;

pub mod join;
pub use join::*;

pub mod stage;
pub use stage::*;

pub mod query;
pub use query::*;
