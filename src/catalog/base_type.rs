use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed nominal type vocabulary for result columns.
///
/// Types form a small hierarchy (see [`BaseType::parent`]); `Wildcard` is the
/// root and stands for "unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseType {
    /// Unknown / any type
    #[default]
    #[serde(rename = "type/*", alias = "*")]
    Wildcard,
    #[serde(rename = "type/Text", alias = "Text")]
    Text,
    #[serde(rename = "type/Number", alias = "Number")]
    Number,
    #[serde(rename = "type/Integer", alias = "Integer")]
    Integer,
    #[serde(rename = "type/BigInteger", alias = "BigInteger")]
    BigInteger,
    #[serde(rename = "type/Float", alias = "Float")]
    Float,
    #[serde(rename = "type/Decimal", alias = "Decimal")]
    Decimal,
    #[serde(rename = "type/Boolean", alias = "Boolean")]
    Boolean,
    #[serde(rename = "type/Temporal", alias = "Temporal")]
    Temporal,
    #[serde(rename = "type/Date", alias = "Date")]
    Date,
    #[serde(rename = "type/DateTime", alias = "DateTime")]
    DateTime,
    #[serde(rename = "type/DateTimeWithTZ", alias = "DateTimeWithTZ")]
    DateTimeWithTz,
    #[serde(rename = "type/Time", alias = "Time")]
    Time,
    /// JSON-like nested values
    #[serde(rename = "type/Structured", alias = "Structured")]
    Structured,
    #[serde(rename = "type/Array", alias = "Array")]
    Array,
}

impl BaseType {
    const ALL: [BaseType; 15] = [
        BaseType::Wildcard,
        BaseType::Text,
        BaseType::Number,
        BaseType::Integer,
        BaseType::BigInteger,
        BaseType::Float,
        BaseType::Decimal,
        BaseType::Boolean,
        BaseType::Temporal,
        BaseType::Date,
        BaseType::DateTime,
        BaseType::DateTimeWithTz,
        BaseType::Time,
        BaseType::Structured,
        BaseType::Array,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::Wildcard => "type/*",
            BaseType::Text => "type/Text",
            BaseType::Number => "type/Number",
            BaseType::Integer => "type/Integer",
            BaseType::BigInteger => "type/BigInteger",
            BaseType::Float => "type/Float",
            BaseType::Decimal => "type/Decimal",
            BaseType::Boolean => "type/Boolean",
            BaseType::Temporal => "type/Temporal",
            BaseType::Date => "type/Date",
            BaseType::DateTime => "type/DateTime",
            BaseType::DateTimeWithTz => "type/DateTimeWithTZ",
            BaseType::Time => "type/Time",
            BaseType::Structured => "type/Structured",
            BaseType::Array => "type/Array",
        }
    }

    /// Parse either the namespaced (`type/Integer`) or the bare (`Integer`) spelling.
    pub fn parse(text: &str) -> Option<BaseType> {
        let bare = text.strip_prefix("type/").unwrap_or(text);
        Self::ALL.into_iter().find(|ty| &ty.as_str()[5..] == bare)
    }

    /// Direct ancestor in the type hierarchy, `None` for the root.
    pub fn parent(&self) -> Option<BaseType> {
        use BaseType::*;
        match self {
            Wildcard => None,
            Integer | Float => Some(Number),
            BigInteger => Some(Integer),
            Decimal => Some(Float),
            Date | DateTime | Time => Some(Temporal),
            DateTimeWithTz => Some(DateTime),
            Text | Number | Boolean | Temporal | Structured | Array => Some(Wildcard),
        }
    }

    /// `true` when `self` equals `ancestor` or descends from it.
    pub fn is_a(&self, ancestor: BaseType) -> bool {
        let mut current = Some(*self);
        while let Some(ty) = current {
            if ty == ancestor {
                return true;
            }
            current = ty.parent();
        }
        false
    }

    pub fn is_wildcard(&self) -> bool {
        *self == BaseType::Wildcard
    }

    pub fn is_temporal(&self) -> bool {
        self.is_a(BaseType::Temporal)
    }

    /// Classify a sample JSON value.
    pub fn of_value(value: &Value) -> BaseType {
        match value {
            Value::Null => BaseType::Wildcard,
            Value::Bool(_) => BaseType::Boolean,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    BaseType::Integer
                } else {
                    BaseType::Float
                }
            }
            Value::String(_) => BaseType::Text,
            Value::Array(_) => BaseType::Array,
            Value::Object(_) => BaseType::Structured,
        }
    }
}
