use serde_json::Value;

use crate::parser::{ast::Clause, ParseError};

/// One aggregation clause, optionally wrapped in `aggregation-options`.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub clause: Clause,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub ident: Option<String>,
}

impl Aggregation {
    pub fn new(clause: Clause) -> Self {
        Self { clause, name: None, display_name: None, ident: None }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_ident(mut self, ident: &str) -> Self {
        self.ident = Some(ident.to_string());
        self
    }

    pub fn parse(value: &Value, path: &str) -> Result<Aggregation, ParseError> {
        let items = value.as_array();
        let is_wrapped = items
            .and_then(|items| items.first())
            .and_then(Value::as_str)
            .is_some_and(|op| op == "aggregation-options");
        if !is_wrapped {
            return Ok(Aggregation::new(Clause::parse(value, path)?));
        }

        let items = items.map(Vec::as_slice).unwrap_or_default();
        let inner = items
            .get(1)
            .ok_or_else(|| ParseError::new("aggregation-options needs a clause", path, value))?;
        let mut aggregation = Aggregation::new(Clause::parse(inner, &format!("{path}/1"))?);
        if let Some(opts) = items.get(2) {
            aggregation.name = opts.get("name").and_then(Value::as_str).map(str::to_string);
            aggregation.display_name = opts.get("display-name").and_then(Value::as_str).map(str::to_string);
        }
        Ok(aggregation)
    }
}
