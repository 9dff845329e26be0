use tracing::{trace, warn};

use crate::{
    catalog::BaseType,
    parser::{
        analyzer::{AnnotateResult, ColumnMetadata, FieldRefResolver, ResolveContext},
        ast::{Clause, Literal, Stage, TemporalUnit},
    },
};

const STRING_FUNCTIONS: &[&str] = &[
    "substring", "trim", "ltrim", "rtrim", "upper", "lower", "concat", "replace",
    "regex-match-first", "split-part", "text", "host", "domain", "subdomain", "path",
    "month-name", "quarter-name", "day-name",
];

const NUMERIC_FUNCTIONS: &[&str] = &[
    "+", "-", "*", "/", "abs", "ceil", "floor", "round", "sqrt", "power", "exp", "log",
    "integer", "float", "datetime-diff", "temporal-extract", "get-year", "get-quarter",
    "get-month", "get-week", "get-day", "get-day-of-week", "get-hour", "get-minute", "get-second",
];

const BOOLEAN_FUNCTIONS: &[&str] = &[
    "and", "or", "not", "=", "!=", "<", ">", "<=", ">=", "between", "in", "not-in",
    "is-null", "not-null", "is-empty", "not-empty", "starts-with", "ends-with", "contains",
    "does-not-contain", "inside", "time-interval",
];

const DATETIME_ARITHMETIC: &[&str] = &["datetime-add", "datetime-subtract", "relative-datetime"];

/// Type facts derived for an expression.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InferredType {
    pub base_type: BaseType,
    pub effective_type: Option<BaseType>,
    pub coercion_strategy: Option<String>,
    pub unit: Option<TemporalUnit>,
    pub converted_timezone: Option<String>,
}

impl InferredType {
    pub fn of(base_type: BaseType) -> Self {
        Self { base_type, ..Self::default() }
    }

    pub fn from_column(col: &ColumnMetadata) -> Self {
        Self {
            base_type: col.base_type,
            effective_type: col.effective_type,
            coercion_strategy: col.coercion_strategy.clone(),
            unit: col.unit,
            converted_timezone: col.converted_timezone.clone(),
        }
    }

    /// Keep the type itself, drop auxiliary facts.
    pub fn type_only(self) -> Self {
        Self {
            base_type: self.base_type,
            effective_type: self.effective_type,
            coercion_strategy: self.coercion_strategy,
            ..Self::default()
        }
    }

    pub fn apply_to(self, col: &mut ColumnMetadata) {
        col.base_type = self.base_type;
        col.effective_type = self.effective_type;
        col.coercion_strategy = self.coercion_strategy;
        if self.unit.is_some() {
            col.unit = self.unit;
        }
        col.converted_timezone = self.converted_timezone;
    }
}

/// Syntactic type inference for expression clauses.
///
/// Rules are tried in a fixed order and the first match wins. A timezone
/// conversion fact survives one level of date arithmetic around the
/// conversion clause itself, but not a hop through a named-expression
/// reference: `["expression", "converted"]` keeps the type of the named
/// clause and drops its `converted_timezone`.
pub struct TypeInference;

impl TypeInference {
    pub fn infer(ctx: &ResolveContext, stage: &Stage, clause: &Clause) -> AnnotateResult<InferredType> {
        Self::infer_within(ctx, stage, clause, &mut Vec::new())
    }

    /// `expanding` holds the named expressions currently being inferred.
    fn infer_within(
        ctx: &ResolveContext,
        stage: &Stage,
        clause: &Clause,
        expanding: &mut Vec<String>,
    ) -> AnnotateResult<InferredType> {
        match clause {
            Clause::Literal(lit) => {
                if let Some(ty) = Self::literal_type(lit) {
                    return Ok(InferredType::of(ty));
                }
            }
            Clause::Value { value, options } => {
                return match options.base_type {
                    Some(base_type) => Ok(InferredType {
                        base_type,
                        effective_type: options.effective_type,
                        ..InferredType::default()
                    }),
                    None => Self::infer_within(ctx, stage, value, expanding),
                };
            }
            Clause::Field(field) => {
                let col = FieldRefResolver::resolve(ctx, stage, field)?;
                return Ok(InferredType::from_column(&col));
            }
            Clause::Call { op, args } if op == "coalesce" && !args.is_empty() => {
                return Ok(Self::infer_within(ctx, stage, &args[0], expanding)?.type_only());
            }
            Clause::Call { op, .. } if op == "length" => {
                return Ok(InferredType::of(BaseType::BigInteger));
            }
            Clause::Case { branches, .. } => {
                if let Some((_, value)) = branches.iter().find(|(_, value)| !value.is_null_literal()) {
                    return Self::infer_within(ctx, stage, value, expanding);
                }
            }
            Clause::Call { op, args } if op == "convert-timezone" => {
                let target = match args.get(1) {
                    Some(Clause::Literal(Literal::String(tz))) => Some(tz.clone()),
                    _ => None,
                };
                return Ok(InferredType {
                    base_type: BaseType::DateTime,
                    converted_timezone: target,
                    ..InferredType::default()
                });
            }
            Clause::Expression { name, options } if options.temporal_unit.is_none() => {
                if let Some(named) = stage.expressions.get(name) {
                    if expanding.contains(name) {
                        warn!(%name, "named expression refers to itself, using wildcard type");
                        return Ok(InferredType::of(BaseType::Wildcard));
                    }
                    expanding.push(name.clone());
                    let inferred = Self::infer_within(ctx, stage, &named.clause, expanding);
                    expanding.pop();
                    return Ok(inferred?.type_only());
                }
            }
            _ => {}
        }

        if Self::is_datetime_arithmetic(clause) {
            let converted_timezone = match clause {
                Clause::Call { args, .. } if !args.is_empty() => {
                    Self::infer_within(ctx, stage, &args[0], expanding)?.converted_timezone
                }
                _ => None,
            };
            return Ok(InferredType { base_type: BaseType::DateTime, converted_timezone, ..InferredType::default() });
        }

        if let Some(op) = clause.op() {
            if STRING_FUNCTIONS.contains(&op) {
                return Ok(InferredType::of(BaseType::Text));
            }
            if NUMERIC_FUNCTIONS.contains(&op) {
                return Ok(InferredType::of(BaseType::Float));
            }
            if BOOLEAN_FUNCTIONS.contains(&op) {
                return Ok(InferredType::of(BaseType::Boolean));
            }
            warn!(op, "no type rule for clause, using wildcard type");
        } else {
            trace!(%clause, "clause shape has no type rule, using wildcard type");
        }
        Ok(InferredType::of(BaseType::Wildcard))
    }

    fn literal_type(lit: &Literal) -> Option<BaseType> {
        match lit {
            Literal::String(_) => Some(BaseType::Text),
            Literal::Int(_) | Literal::Float(_) => Some(BaseType::Number),
            Literal::Bool(_) => Some(BaseType::Boolean),
            Literal::Null => None,
        }
    }

    fn is_datetime_arithmetic(clause: &Clause) -> bool {
        match clause {
            Clause::Call { op, args } => {
                DATETIME_ARITHMETIC.contains(&op.as_str())
                    || (op == "+" && args.iter().any(|arg| matches!(arg, Clause::Interval { .. })))
            }
            Clause::Expression { options, .. } => options.temporal_unit.is_some(),
            _ => false,
        }
    }
}
