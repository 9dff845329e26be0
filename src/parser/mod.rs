pub mod ast;

pub mod parse_error;
pub use parse_error::*;

pub mod analyzer;
