use std::fmt::Display;

use thiserror::Error;

use crate::parser::{ParseError, ParseErrorKind};

pub type AnnotateResult<T> = Result<T, AnnotateError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnnotateError {
    /// Neither the catalog, the declared source metadata nor a parent stage explains a reference.
    #[error("cannot resolve {reference}: {reason}")]
    UnresolvableReference { reference: String, reason: String },

    /// The executed rows do not have the width of the computed schema.
    #[error("mismatched number of columns in query and results: expected {expected_count}, got {actual_count}")]
    SchemaMismatch {
        expected_count: usize,
        actual_count: usize,
        expected_columns: Vec<String>,
        actual_columns: Vec<String>,
    },

    #[error("unknown query kind `{0}`")]
    UnknownStageKind(String),

    /// Raised only when not running in production mode.
    #[error("metadata consistency check failed: {0}")]
    ConsistencyCheck(String),

    #[error("stage nesting depth {depth} exceeds the limit of {max}")]
    NestingTooDeep { depth: usize, max: usize },

    #[error("{0}")]
    Parse(ParseError),

    #[error("query execution failed: {0}")]
    Execution(String),
}

impl AnnotateError {
    pub fn unresolvable(reference: impl Display, reason: impl Into<String>) -> Self {
        AnnotateError::UnresolvableReference { reference: reference.to_string(), reason: reason.into() }
    }
}

impl From<ParseError> for AnnotateError {
    fn from(error: ParseError) -> Self {
        match &error.kind {
            ParseErrorKind::UnknownStageKind(kind) => AnnotateError::UnknownStageKind(kind.clone()),
            ParseErrorKind::TooDeep { depth, max } => AnnotateError::NestingTooDeep { depth: *depth, max: *max },
            ParseErrorKind::Malformed => AnnotateError::Parse(error),
        }
    }
}
