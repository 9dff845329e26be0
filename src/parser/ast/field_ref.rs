use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;

use crate::{
    catalog::BaseType,
    parser::{ast::{Binning, TemporalUnit}, ParseError},
};

/// A field is addressed either by stable catalog id or by the name a source stage gave it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldId {
    Id(i64),
    Name(String),
}

impl FieldId {
    pub fn to_value(&self) -> Value {
        match self {
            FieldId::Id(id) => Value::from(*id),
            FieldId::Name(name) => Value::String(name.clone()),
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldId::Id(id) => write!(f, "{id}"),
            FieldId::Name(name) => write!(f, "\"{name}\""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldOptions {
    pub base_type: Option<BaseType>,
    pub join_alias: Option<String>,
    /// foreign key the field is reached through (implicit join)
    pub source_field: Option<i64>,
    pub temporal_unit: Option<TemporalUnit>,
    pub binning: Option<Binning>,
    /// stage-internal options (keys containing `/`), never part of emitted refs
    pub namespaced: IndexMap<String, Value>,
}

impl FieldOptions {
    pub fn parse(value: &Value, path: &str) -> Result<FieldOptions, ParseError> {
        let obj = match value {
            Value::Null => return Ok(FieldOptions::default()),
            Value::Object(obj) => obj,
            other => return ParseError::new("Field options must be an object", path, other).err(),
        };

        let mut options = FieldOptions::default();
        for (key, v) in obj {
            match key.as_str() {
                "base-type" => {
                    let ty = v.as_str().and_then(BaseType::parse)
                        .ok_or_else(|| ParseError::new("Unknown base type", &format!("{path}/{key}"), v))?;
                    options.base_type = Some(ty);
                }
                "join-alias" => {
                    let alias = v.as_str()
                        .ok_or_else(|| ParseError::new("Join alias must be a string", &format!("{path}/{key}"), v))?;
                    options.join_alias = Some(alias.to_string());
                }
                "source-field" => {
                    let id = v.as_i64()
                        .ok_or_else(|| ParseError::new("Source field must be an integer id", &format!("{path}/{key}"), v))?;
                    options.source_field = Some(id);
                }
                "temporal-unit" => {
                    let unit = v.as_str().and_then(TemporalUnit::parse)
                        .ok_or_else(|| ParseError::new("Unknown temporal unit", &format!("{path}/{key}"), v))?;
                    options.temporal_unit = Some(unit);
                }
                "binning" => options.binning = Some(Binning::parse(v, &format!("{path}/{key}"))?),
                k if k.contains('/') => {
                    options.namespaced.insert(key.clone(), v.clone());
                }
                // unknown plain options do not affect column metadata
                _ => {}
            }
        }
        Ok(options)
    }

    pub fn is_empty(&self) -> bool {
        self.base_type.is_none()
            && self.join_alias.is_none()
            && self.source_field.is_none()
            && self.temporal_unit.is_none()
            && self.binning.is_none()
            && self.namespaced.is_empty()
    }

    pub fn to_value(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut obj = Map::new();
        if let Some(ty) = self.base_type {
            obj.insert("base-type".into(), Value::String(ty.as_str().to_string()));
        }
        if let Some(alias) = &self.join_alias {
            obj.insert("join-alias".into(), Value::String(alias.clone()));
        }
        if let Some(id) = self.source_field {
            obj.insert("source-field".into(), Value::from(id));
        }
        if let Some(unit) = self.temporal_unit {
            obj.insert("temporal-unit".into(), serde_json::to_value(unit).unwrap_or(Value::Null));
        }
        if let Some(binning) = &self.binning {
            obj.insert("binning".into(), binning.to_value());
        }
        for (k, v) in &self.namespaced {
            obj.insert(k.clone(), v.clone());
        }
        Value::Object(obj)
    }
}

/// `["field", id-or-name, options]`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRef {
    pub id: FieldId,
    pub options: FieldOptions,
}

impl FieldRef {
    pub fn by_id(id: i64) -> Self {
        Self { id: FieldId::Id(id), options: FieldOptions::default() }
    }

    pub fn by_name(name: &str) -> Self {
        Self { id: FieldId::Name(name.to_string()), options: FieldOptions::default() }
    }

    pub fn with_base_type(mut self, base_type: BaseType) -> Self {
        self.options.base_type = Some(base_type);
        self
    }

    pub fn with_join_alias(mut self, alias: &str) -> Self {
        self.options.join_alias = Some(alias.to_string());
        self
    }

    pub fn with_source_field(mut self, fk_field_id: i64) -> Self {
        self.options.source_field = Some(fk_field_id);
        self
    }

    pub fn with_temporal_unit(mut self, unit: TemporalUnit) -> Self {
        self.options.temporal_unit = Some(unit);
        self
    }

    /// Parse the tail of a `["field", ...]` clause (everything after the tag).
    pub fn parse_args(args: &[Value], path: &str, whole: &Value) -> Result<FieldRef, ParseError> {
        let id = match args.first() {
            Some(Value::Number(n)) => n.as_i64().map(FieldId::Id),
            Some(Value::String(s)) => Some(FieldId::Name(s.clone())),
            _ => None,
        }
        .ok_or_else(|| ParseError::new("Field reference needs an integer id or a name", path, whole))?;

        let options = match args.get(1) {
            Some(opts) => FieldOptions::parse(opts, &format!("{path}/2"))?,
            None => FieldOptions::default(),
        };
        if args.len() > 2 {
            return ParseError::new("Field reference takes at most two arguments", path, whole).err();
        }
        Ok(FieldRef { id, options })
    }

    /// Copy without stage-internal (namespaced) options.
    pub fn without_namespaced(&self) -> FieldRef {
        let mut copy = self.clone();
        copy.options.namespaced.clear();
        copy
    }

    pub fn to_value(&self) -> Value {
        Value::Array(vec![Value::String("field".into()), self.id.to_value(), self.options.to_value()])
    }
}
