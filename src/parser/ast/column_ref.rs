use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parser::{ast::{FieldId, FieldOptions, FieldRef}, ParseError};

/// Reference that re-selects a result column from an outer stage.
///
/// Serialized in the legacy array form: `["field", 10, null]`,
/// `["expression", "profit"]`, `["aggregation", 0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum ColumnRef {
    Field(FieldRef),
    Expression { name: String, options: FieldOptions },
    Aggregation(usize),
}

impl ColumnRef {
    pub fn expression(name: &str) -> Self {
        ColumnRef::Expression { name: name.to_string(), options: FieldOptions::default() }
    }

    pub fn field(&self) -> Option<&FieldRef> {
        match self {
            ColumnRef::Field(field) => Some(field),
            _ => None,
        }
    }

    /// Name-based field ref for re-selecting a column from the stage that wraps it.
    pub fn by_name(name: &str, options: FieldOptions) -> Self {
        ColumnRef::Field(FieldRef { id: FieldId::Name(name.to_string()), options })
    }

    pub fn parse(value: &Value, path: &str) -> Result<ColumnRef, ParseError> {
        let items = value
            .as_array()
            .ok_or_else(|| ParseError::new("Column reference must be an array", path, value))?;
        match items.first().and_then(Value::as_str) {
            Some("field") => Ok(ColumnRef::Field(FieldRef::parse_args(&items[1..], path, value)?)),
            Some("expression") => {
                let name = items.get(1).and_then(Value::as_str)
                    .ok_or_else(|| ParseError::new("Expression reference needs a name", path, value))?;
                let options = match items.get(2) {
                    Some(opts) => FieldOptions::parse(opts, &format!("{path}/2"))?,
                    None => FieldOptions::default(),
                };
                Ok(ColumnRef::Expression { name: name.to_string(), options })
            }
            Some("aggregation") => {
                let index = items.get(1).and_then(Value::as_u64)
                    .ok_or_else(|| ParseError::new("Aggregation reference needs an index", path, value))?;
                Ok(ColumnRef::Aggregation(index as usize))
            }
            _ => ParseError::new("Unknown column reference", path, value).err(),
        }
    }
}

impl TryFrom<Value> for ColumnRef {
    type Error = ParseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        ColumnRef::parse(&value, "/field_ref")
    }
}

impl From<ColumnRef> for Value {
    fn from(column_ref: ColumnRef) -> Self {
        match column_ref {
            ColumnRef::Field(field) => field.to_value(),
            ColumnRef::Expression { name, options } => {
                let mut items = vec![Value::String("expression".into()), Value::String(name)];
                if !options.is_empty() {
                    items.push(options.to_value());
                }
                Value::Array(items)
            }
            ColumnRef::Aggregation(index) => Value::Array(vec![Value::String("aggregation".into()), Value::from(index)]),
        }
    }
}
