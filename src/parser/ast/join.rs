use serde_json::Value;

use crate::parser::{ast::{Clause, Stage}, ParseError};

/// A stage joined into another stage under `alias`.
///
/// A join that carries `fk_field_id` came from following a foreign key
/// (implicit join); one without it was written explicitly with a condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub alias: String,
    /// the joined stage; its `source_metadata` is the join's declared metadata
    pub stage: Stage,
    pub condition: Option<Clause>,
    pub fk_field_id: Option<i64>,
    pub ident: Option<String>,
}

impl Join {
    pub fn explicit(alias: &str, stage: Stage, condition: Clause) -> Self {
        Self { alias: alias.to_string(), stage, condition: Some(condition), fk_field_id: None, ident: None }
    }

    pub fn implicit(alias: &str, stage: Stage, fk_field_id: i64) -> Self {
        Self { alias: alias.to_string(), stage, condition: None, fk_field_id: Some(fk_field_id), ident: None }
    }

    pub fn with_ident(mut self, ident: &str) -> Self {
        self.ident = Some(ident.to_string());
        self
    }

    pub fn is_implicit(&self) -> bool {
        self.fk_field_id.is_some()
    }

    pub fn parse(value: &Value, path: &str, depth: usize, max_depth: usize) -> Result<Join, ParseError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ParseError::new("Join must be an object", path, value))?;
        let alias = obj
            .get("alias")
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::new("Join needs an alias", path, value))?;
        let condition = match obj.get("condition") {
            Some(Value::Null) | None => None,
            Some(c) => Some(Clause::parse(c, &format!("{path}/condition"))?),
        };

        Ok(Join {
            alias: alias.to_string(),
            stage: Stage::parse(value, path, depth + 1, max_depth)?,
            condition,
            fk_field_id: obj.get("fk-field-id").and_then(Value::as_i64),
            ident: obj.get("ident").and_then(Value::as_str).map(str::to_string),
        })
    }
}
