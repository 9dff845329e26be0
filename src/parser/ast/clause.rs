use serde_json::Value;
use std::fmt;

use crate::{
    catalog::BaseType,
    parser::{ast::{FieldOptions, FieldRef, Literal, TemporalUnit}, ParseError},
};

/// Type hints carried by a `["value", v, {...}]` wrapper.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueOptions {
    pub base_type: Option<BaseType>,
    pub effective_type: Option<BaseType>,
}

/// Expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Literal(Literal),
    Value { value: Box<Clause>, options: ValueOptions },
    Field(FieldRef),
    /// reference to a named expression of the same stage
    Expression { name: String, options: FieldOptions },
    /// reference to an aggregation of the same stage, by index
    AggregationRef(usize),
    Interval { amount: i64, unit: TemporalUnit },
    Case { branches: Vec<(Clause, Clause)>, default: Option<Box<Clause>> },
    /// any other operator: functions, arithmetic, aggregations, filters
    Call { op: String, args: Vec<Clause> },
}

impl Clause {
    pub fn call(op: &str, args: Vec<Clause>) -> Clause {
        Clause::Call { op: op.to_string(), args }
    }

    pub fn string(value: &str) -> Clause {
        Clause::Literal(Literal::String(value.to_string()))
    }

    pub fn int(value: i64) -> Clause {
        Clause::Literal(Literal::Int(value))
    }

    pub fn expression(name: &str) -> Clause {
        Clause::Expression { name: name.to_string(), options: FieldOptions::default() }
    }

    pub fn is_null_literal(&self) -> bool {
        match self {
            Clause::Literal(lit) => lit.is_null(),
            Clause::Value { value, .. } => value.is_null_literal(),
            _ => false,
        }
    }

    /// Operator tag for calls, `None` for every other node.
    pub fn op(&self) -> Option<&str> {
        match self {
            Clause::Call { op, .. } => Some(op.as_str()),
            _ => None,
        }
    }

    pub fn parse(value: &Value, path: &str) -> Result<Clause, ParseError> {
        if let Some(lit) = Literal::from_value(value) {
            return Ok(Clause::Literal(lit));
        }
        let items = match value {
            Value::Array(items) => items,
            other => return ParseError::new("Expected a literal or a clause array", path, other).err(),
        };
        let op = items
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::new("Clause must start with an operator name", path, value))?;
        let args = &items[1..];

        match op {
            "field" => Ok(Clause::Field(FieldRef::parse_args(args, path, value)?)),
            "expression" => {
                let name = args.first().and_then(Value::as_str)
                    .ok_or_else(|| ParseError::new("Expression reference needs a name", path, value))?;
                let options = match args.get(1) {
                    Some(opts) => FieldOptions::parse(opts, &format!("{path}/2"))?,
                    None => FieldOptions::default(),
                };
                Ok(Clause::Expression { name: name.to_string(), options })
            }
            "aggregation" => {
                let index = args.first().and_then(Value::as_u64)
                    .ok_or_else(|| ParseError::new("Aggregation reference needs an index", path, value))?;
                Ok(Clause::AggregationRef(index as usize))
            }
            "value" => Self::parse_value(args, path, value),
            "interval" => {
                let amount = args.first().and_then(Value::as_i64);
                let unit = args.get(1).and_then(Value::as_str).and_then(TemporalUnit::parse);
                match (amount, unit) {
                    (Some(amount), Some(unit)) => Ok(Clause::Interval { amount, unit }),
                    _ => ParseError::new("Interval needs an amount and a unit", path, value).err(),
                }
            }
            "case" | "if" => Self::parse_case(args, path, value),
            _ => {
                let mut parsed = Vec::with_capacity(args.len());
                for (i, arg) in args.iter().enumerate() {
                    parsed.push(Clause::parse(arg, &format!("{path}/{}", i + 1))?);
                }
                Ok(Clause::Call { op: op.to_string(), args: parsed })
            }
        }
    }

    fn parse_value(args: &[Value], path: &str, whole: &Value) -> Result<Clause, ParseError> {
        let inner = args
            .first()
            .ok_or_else(|| ParseError::new("Value clause needs a value", path, whole))?;
        let inner = Clause::parse(inner, &format!("{path}/1"))?;

        let mut options = ValueOptions::default();
        if let Some(Value::Object(opts)) = args.get(1) {
            // both snake_case and kebab-case spellings show up in the wild
            let read = |snake: &str, kebab: &str| {
                opts.get(snake).or_else(|| opts.get(kebab)).and_then(Value::as_str).and_then(BaseType::parse)
            };
            options.base_type = read("base_type", "base-type");
            options.effective_type = read("effective_type", "effective-type");
        }
        Ok(Clause::Value { value: Box::new(inner), options })
    }

    fn parse_case(args: &[Value], path: &str, whole: &Value) -> Result<Clause, ParseError> {
        let pairs = args
            .first()
            .and_then(Value::as_array)
            .ok_or_else(|| ParseError::new("Case needs a list of [condition, value] pairs", path, whole))?;

        let mut branches = Vec::with_capacity(pairs.len());
        for (i, pair) in pairs.iter().enumerate() {
            let branch_path = format!("{path}/1/{i}");
            match pair.as_array().map(Vec::as_slice) {
                Some([condition, value]) => branches.push((
                    Clause::parse(condition, &format!("{branch_path}/0"))?,
                    Clause::parse(value, &format!("{branch_path}/1"))?,
                )),
                _ => return ParseError::new("Case branch must be a [condition, value] pair", &branch_path, pair).err(),
            }
        }

        let default = match args.get(1).and_then(|opts| opts.get("default")) {
            Some(v) => Some(Box::new(Clause::parse(v, &format!("{path}/2/default"))?)),
            None => None,
        };
        Ok(Clause::Case { branches, default })
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Literal(lit) => write!(f, "{lit}"),
            Clause::Value { value, .. } => write!(f, "{value}"),
            Clause::Field(field) => write!(f, "field({})", field.id),
            Clause::Expression { name, .. } => write!(f, "expression(\"{name}\")"),
            Clause::AggregationRef(i) => write!(f, "aggregation({i})"),
            Clause::Interval { amount, unit } => write!(f, "interval({amount}, {})", unit.display_name()),
            Clause::Case { branches, .. } => write!(f, "case(<{} branches>)", branches.len()),
            Clause::Call { op, args } => {
                write!(f, "{op}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::FieldId;
    use serde_json::json;

    #[test]
    fn parse_value_wrapper_with_type_options() {
        let clause = Clause::parse(&json!(["value", "x", {"base_type": "Integer"}]), "/e").unwrap();
        match clause {
            Clause::Value { value, options } => {
                assert_eq!(*value, Clause::string("x"));
                assert_eq!(options.base_type, Some(BaseType::Integer));
            }
            other => panic!("expected Value, got {other:?}"),
        }
    }

    #[test]
    fn parse_nested_call() {
        let clause = Clause::parse(&json!(["+", ["field", 1, null], ["interval", 3, "day"]]), "/e").unwrap();
        match clause {
            Clause::Call { op, args } => {
                assert_eq!(op, "+");
                assert!(matches!(&args[0], Clause::Field(f) if f.id == FieldId::Id(1)));
                assert_eq!(args[1], Clause::Interval { amount: 3, unit: TemporalUnit::Day });
            }
            other => panic!("expected Call, got {other:?}"),
        }
    }

    #[test]
    fn parse_case_branches_and_default() {
        let clause = Clause::parse(
            &json!(["case", [[["=", 1, 1], null], [["=", 1, 2], "b"]], {"default": "z"}]),
            "/e",
        )
        .unwrap();
        match clause {
            Clause::Case { branches, default } => {
                assert_eq!(branches.len(), 2);
                assert!(branches[0].1.is_null_literal());
                assert_eq!(default.as_deref(), Some(&Clause::string("z")));
            }
            other => panic!("expected Case, got {other:?}"),
        }
    }

    #[test]
    fn errors_carry_the_path() {
        let err = Clause::parse(&json!(["sum", {"oops": 1}]), "/query/aggregation/0").unwrap_err();
        assert_eq!(err.path, "/query/aggregation/0/1");
    }
}
