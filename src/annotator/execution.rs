use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    catalog::BaseType,
    parser::{analyzer::ColumnMetadata, ast::Query},
};

/// Column metadata as a driver reports it after running a query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawColumn {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_type: Option<BaseType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_type: Option<BaseType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_type: Option<String>,
    /// catalog field id, when the driver knows it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl RawColumn {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), ..Self::default() }
    }

    pub fn with_base_type(mut self, base_type: BaseType) -> Self {
        self.base_type = Some(base_type);
        self
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }
}

/// What the execution collaborator hands back: columns line up positionally with rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionResult {
    pub columns: Vec<RawColumn>,
    pub rows: Vec<Vec<Value>>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl ExecutionResult {
    pub fn new(columns: Vec<RawColumn>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows, extra: IndexMap::new() }
    }

    /// Width of the first row; `None` for an empty sample.
    pub fn row_width(&self) -> Option<usize> {
        self.rows.first().map(Vec::len)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// Execution result with the computed column descriptors in place of the raw ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedResult {
    pub columns: Vec<ColumnMetadata>,
    pub rows: Vec<Vec<Value>>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

pub trait QueryRunner {
    fn execute(&self, query: &Query) -> Result<ExecutionResult, String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn driver_payload_keeps_unknown_keys() {
        let result: ExecutionResult = serde_json::from_value(json!({
            "columns": [{"name": "total", "base_type": "type/Number", "some_driver_field": "x"}],
            "rows": [[1]],
            "row_count": 1,
        }))
        .unwrap();

        assert_eq!(result.columns[0].base_type, Some(BaseType::Number));
        assert_eq!(result.columns[0].extra.get("some_driver_field"), Some(&json!("x")));
        assert_eq!(result.extra.get("row_count"), Some(&json!(1)));
        assert_eq!(result.row_width(), Some(1));
    }
}
