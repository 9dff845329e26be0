pub mod config;
pub use config::*;

pub mod execution;
pub use execution::*;

pub mod metadata_merger;
pub use metadata_merger::*;

pub mod native_columns;
pub use native_columns::*;

pub mod annotator;
pub use annotator::*;
