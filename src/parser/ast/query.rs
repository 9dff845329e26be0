use serde_json::Value;

use crate::parser::{ast::Stage, ParseError};

/// Default stage-nesting limit used by [`Query::parse`].
pub const DEFAULT_MAX_STAGE_DEPTH: usize = 32;

/// Opaque native query; only the execution collaborator understands it.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeQuery {
    pub native: Value,
}

impl NativeQuery {
    pub fn new(native: Value) -> Self {
        Self { native }
    }
}

/// A query is either structural (stages this crate can analyze) or native.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Structural(Stage),
    Native(NativeQuery),
}

impl Query {
    pub fn stage(&self) -> Option<&Stage> {
        match self {
            Query::Structural(stage) => Some(stage),
            Query::Native(_) => None,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Query::Native(_))
    }

    /// Read a top-level `{"type": "query" | "native", ...}` document.
    pub fn parse(value: &Value) -> Result<Query, ParseError> {
        Self::parse_with_limit(value, DEFAULT_MAX_STAGE_DEPTH)
    }

    pub fn parse_with_limit(value: &Value, max_depth: usize) -> Result<Query, ParseError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::unknown_stage_kind("", "/type", value))?;
        match kind {
            "query" => {
                let inner = value
                    .get("query")
                    .ok_or_else(|| ParseError::new("Structural query needs a `query` key", "/query", value))?;
                Ok(Query::Structural(Stage::parse(inner, "/query", 1, max_depth)?))
            }
            "native" => {
                let native = value
                    .get("native")
                    .ok_or_else(|| ParseError::new("Native query needs a `native` key", "/native", value))?;
                Ok(Query::Native(NativeQuery::new(native.clone())))
            }
            other => ParseError::unknown_stage_kind(other, "/type", value).err(),
        }
    }

    /// Nested `source-query` maps carry no `type`; a `native` key marks native ones.
    pub fn parse_inner(value: &Value, path: &str, depth: usize, max_depth: usize) -> Result<Query, ParseError> {
        match value.get("native") {
            Some(native) => Ok(Query::Native(NativeQuery::new(native.clone()))),
            None => Ok(Query::Structural(Stage::parse(value, path, depth, max_depth)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseErrorKind;
    use serde_json::json;

    #[test]
    fn parse_dispatches_on_type() {
        let q = Query::parse(&json!({"type": "native", "native": {"query": "select 1"}})).unwrap();
        assert!(q.is_native());

        let q = Query::parse(&json!({"type": "query", "query": {"source-query": {"native": "select 1"}}})).unwrap();
        assert!(q.stage().expect("structural").source_is_native());
    }

    #[test]
    fn unknown_type_is_reported_as_unknown_stage_kind() {
        let err = Query::parse(&json!({"type": "graph", "query": {}})).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownStageKind("graph".into()));

        let err = Query::parse(&json!({"query": {}})).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownStageKind(String::new()));
    }
}
