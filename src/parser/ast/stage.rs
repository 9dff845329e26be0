use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::parser::{
    analyzer::ColumnMetadata,
    ast::{Aggregation, Clause, Join, Query},
    ParseError,
};

/// Where a stage reads its rows from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StageSource {
    #[default]
    None,
    Table(i64),
    Query(Box<Query>),
}

/// The saved, reusable query a stage reads from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceCard {
    pub card_id: Option<i64>,
    pub entity_id: Option<String>,
    /// saved query exposed as a model
    pub model: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Breakout {
    pub clause: Clause,
    pub ident: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedExpression {
    pub clause: Clause,
    pub ident: Option<String>,
}

/// One level of a structured query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stage {
    pub source: StageSource,
    /// declared schema of this stage's input
    pub source_metadata: Vec<ColumnMetadata>,
    pub source_card: Option<SourceCard>,
    pub joins: Vec<Join>,
    pub breakouts: Vec<Breakout>,
    pub aggregations: Vec<Aggregation>,
    pub expressions: IndexMap<String, NamedExpression>,
    pub fields: Vec<Clause>,
}

impl Stage {
    pub fn from_table(table_id: i64) -> Self {
        Self { source: StageSource::Table(table_id), ..Self::default() }
    }

    pub fn from_query(query: Query) -> Self {
        Self { source: StageSource::Query(Box::new(query)), ..Self::default() }
    }

    pub fn with_breakout(mut self, clause: Clause) -> Self {
        self.breakouts.push(Breakout { clause, ident: None });
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregations.push(aggregation);
        self
    }

    pub fn with_expression(mut self, name: &str, clause: Clause) -> Self {
        self.expressions.insert(name.to_string(), NamedExpression { clause, ident: None });
        self
    }

    pub fn with_field(mut self, clause: Clause) -> Self {
        self.fields.push(clause);
        self
    }

    pub fn with_join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    pub fn with_source_metadata(mut self, columns: Vec<ColumnMetadata>) -> Self {
        self.source_metadata = columns;
        self
    }

    pub fn with_source_card(mut self, card: SourceCard) -> Self {
        self.source_card = Some(card);
        self
    }

    /// The structural stage this one reads from, if any.
    pub fn source_stage(&self) -> Option<&Stage> {
        match &self.source {
            StageSource::Query(query) => query.stage(),
            _ => None,
        }
    }

    pub fn source_is_native(&self) -> bool {
        matches!(&self.source, StageSource::Query(query) if query.is_native())
    }

    pub fn is_model(&self) -> bool {
        self.source_card.as_ref().is_some_and(|card| card.model)
    }

    pub fn declares_join(&self, alias: &str) -> bool {
        self.joins.iter().any(|join| join.alias == alias)
    }

    /// Levels of nesting through source queries and joined stages, counting this one.
    pub fn depth(&self) -> usize {
        let source = self.source_stage().map(Stage::depth).unwrap_or(0);
        let joined = self.joins.iter().map(|join| join.stage.depth()).max().unwrap_or(0);
        1 + source.max(joined)
    }

    pub fn parse(value: &Value, path: &str, depth: usize, max_depth: usize) -> Result<Stage, ParseError> {
        if depth > max_depth {
            return ParseError::too_deep(depth, max_depth, path, value).err();
        }
        let obj = value
            .as_object()
            .ok_or_else(|| ParseError::new("Stage must be an object", path, value))?;

        let mut stage = Stage::default();

        if let Some(table) = obj.get("source-table") {
            let id = table.as_i64()
                .ok_or_else(|| ParseError::new("source-table must be an integer id", &format!("{path}/source-table"), table))?;
            stage.source = StageSource::Table(id);
        }
        if let Some(source) = obj.get("source-query") {
            let source_path = format!("{path}/source-query");
            stage.source = StageSource::Query(Box::new(Query::parse_inner(source, &source_path, depth + 1, max_depth)?));
        }

        if let Some(metadata) = obj.get("source-metadata") {
            stage.source_metadata = Self::parse_metadata(metadata, &format!("{path}/source-metadata"))?;
        }

        let card_id = obj.get("source-card-id").and_then(Value::as_i64);
        let entity_id = obj.get("source-card-entity-id").and_then(Value::as_str).map(str::to_string);
        let model = obj.get("source-query/model?").and_then(Value::as_bool).unwrap_or(false);
        if card_id.is_some() || entity_id.is_some() || model {
            stage.source_card = Some(SourceCard { card_id, entity_id, model });
        }

        for (i, join) in Self::array(obj, "joins", path)?.iter().enumerate() {
            stage.joins.push(Join::parse(join, &format!("{path}/joins/{i}"), depth, max_depth)?);
        }

        let breakout_idents = Self::idents(obj, "breakout-idents");
        for (i, clause) in Self::array(obj, "breakout", path)?.iter().enumerate() {
            stage.breakouts.push(Breakout {
                clause: Clause::parse(clause, &format!("{path}/breakout/{i}"))?,
                ident: breakout_idents.get(&i.to_string()).cloned(),
            });
        }

        let aggregation_idents = Self::idents(obj, "aggregation-idents");
        for (i, clause) in Self::array(obj, "aggregation", path)?.iter().enumerate() {
            let mut aggregation = Aggregation::parse(clause, &format!("{path}/aggregation/{i}"))?;
            aggregation.ident = aggregation_idents.get(&i.to_string()).cloned();
            stage.aggregations.push(aggregation);
        }

        let expression_idents = Self::idents(obj, "expression-idents");
        if let Some(expressions) = obj.get("expressions") {
            let expressions = expressions.as_object()
                .ok_or_else(|| ParseError::new("expressions must be an object", &format!("{path}/expressions"), expressions))?;
            for (name, clause) in expressions {
                stage.expressions.insert(name.clone(), NamedExpression {
                    clause: Clause::parse(clause, &format!("{path}/expressions/{name}"))?,
                    ident: expression_idents.get(name).cloned(),
                });
            }
        }

        for (i, clause) in Self::array(obj, "fields", path)?.iter().enumerate() {
            stage.fields.push(Clause::parse(clause, &format!("{path}/fields/{i}"))?);
        }

        Ok(stage)
    }

    fn array<'v>(obj: &'v Map<String, Value>, key: &str, path: &str) -> Result<&'v [Value], ParseError> {
        match obj.get(key) {
            None | Some(Value::Null) => Ok(&[]),
            Some(Value::Array(items)) => Ok(items.as_slice()),
            Some(other) => ParseError::new(&format!("{key} must be an array"), &format!("{path}/{key}"), other).err(),
        }
    }

    /// Idents come keyed by position (`{"0": "..."}`) or by expression name.
    fn idents(obj: &Map<String, Value>, key: &str) -> IndexMap<String, String> {
        match obj.get(key) {
            Some(Value::Object(map)) => map
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.as_str().map(|s| (i.to_string(), s.to_string())))
                .collect(),
            _ => IndexMap::new(),
        }
    }

    fn parse_metadata(value: &Value, path: &str) -> Result<Vec<ColumnMetadata>, ParseError> {
        serde_json::from_value(value.clone())
            .map_err(|e| ParseError::new(&format!("Invalid column metadata: {e}"), path, value))
    }
}
