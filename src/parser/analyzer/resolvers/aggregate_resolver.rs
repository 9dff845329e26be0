use tracing::warn;

use crate::{
    catalog::BaseType,
    parser::{
        analyzer::{
            AnnotateResult, ColumnMetadata, ColumnSource, FieldRefResolver, InferredType, ResolveContext,
            TypeInference,
        },
        ast::{Aggregation, Clause, ColumnRef, Stage, TemporalUnit},
    },
};

const INFIX_OPERATORS: &[&str] = &["+", "-", "*", "/"];

/// Name, long display name and type of an aggregation clause.
struct Description {
    name: String,
    display_name: String,
    inferred: InferredType,
}

impl Description {
    fn new(name: &str, display_name: String, base_type: BaseType) -> Self {
        Self::typed(name, display_name, InferredType::of(base_type))
    }

    fn typed(name: &str, display_name: String, inferred: InferredType) -> Self {
        Self { name: name.to_string(), display_name, inferred }
    }
}

pub struct AggregateResolver;

impl AggregateResolver {
    pub fn is_aggregate_name(name: &str) -> bool {
        matches!(
            name,
            "count" | "cum-count" | "distinct" | "count-where" | "sum" | "cum-sum" | "sum-where" | "min" | "max"
                | "avg" | "median" | "stddev" | "var" | "share"
        )
    }

    /// Column for the aggregation at `index` of `stage`.
    pub fn resolve(
        ctx: &ResolveContext,
        stage: &Stage,
        index: usize,
        aggregation: &Aggregation,
    ) -> AnnotateResult<ColumnMetadata> {
        let description = Self::describe(ctx, stage, &aggregation.clause)?;

        let name = aggregation.name.as_deref().unwrap_or(&description.name);
        let display_name = aggregation.display_name.as_deref().unwrap_or(&description.display_name);
        let mut col = ColumnMetadata::new(name, display_name, BaseType::Wildcard)
            .with_source(ColumnSource::Aggregation)
            .with_field_ref(ColumnRef::Aggregation(index));
        description.inferred.type_only().apply_to(&mut col);
        col.aggregation_index = Some(index);
        col.ident = aggregation.ident.clone();
        Ok(col)
    }

    fn describe(ctx: &ResolveContext, stage: &Stage, clause: &Clause) -> AnnotateResult<Description> {
        let (op, args) = match clause {
            Clause::Call { op, args } if Self::is_aggregate_name(op) => (op.as_str(), args.as_slice()),
            other => {
                return Ok(Description::typed(
                    "expression",
                    Self::display_clause(ctx, stage, other)?,
                    TypeInference::infer(ctx, stage, other)?,
                ));
            }
        };

        let arg = args.first();
        let arg_display = match arg {
            Some(arg) => Some(Self::display_clause(ctx, stage, arg)?),
            None => None,
        };
        let of = |prefix: &str| match &arg_display {
            Some(display) => format!("{prefix} of {display}"),
            None => prefix.to_string(),
        };
        let arg_type = || -> AnnotateResult<InferredType> {
            match arg {
                Some(arg) => TypeInference::infer(ctx, stage, arg),
                None => Ok(InferredType::of(BaseType::Wildcard)),
            }
        };

        Ok(match op {
            "count" => Description::new("count", of("Count"), BaseType::BigInteger),
            "cum-count" => Description::new("count", of("Cumulative count"), BaseType::BigInteger),
            "distinct" => Description::new("count", of("Distinct values"), BaseType::BigInteger),
            "count-where" => {
                Description::new("count-where", "Count of rows matching condition".into(), BaseType::BigInteger)
            }
            "sum" => Description::typed("sum", of("Sum"), arg_type()?),
            "cum-sum" => Description::typed("sum", of("Cumulative sum"), arg_type()?),
            "sum-where" => Description::typed("sum-where", format!("{} matching condition", of("Sum")), arg_type()?),
            "min" => Description::typed("min", of("Min"), arg_type()?),
            "max" => Description::typed("max", of("Max"), arg_type()?),
            "avg" => Description::new("avg", of("Average"), BaseType::Float),
            "median" => Description::new("median", of("Median"), BaseType::Float),
            "stddev" => Description::new("stddev", of("Standard deviation"), BaseType::Float),
            "var" => Description::new("var", of("Variance"), BaseType::Float),
            "share" => Description::new("share", "Percentage of rows matching condition".into(), BaseType::Float),
            other => {
                warn!(op = other, "aggregation has no naming rule, describing it as an expression");
                let display_name = match &arg_display {
                    Some(display) => format!("{other}({display})"),
                    None => other.to_string(),
                };
                Description::new("expression", display_name, BaseType::Wildcard)
            }
        })
    }

    /// Human rendering of an aggregation argument, fields in long style.
    fn display_clause(ctx: &ResolveContext, stage: &Stage, clause: &Clause) -> AnnotateResult<String> {
        Ok(match clause {
            Clause::Field(field) => Self::long_display_name(&FieldRefResolver::resolve(ctx, stage, field)?),
            Clause::Expression { name, .. } => name.clone(),
            Clause::Value { value, .. } => Self::display_clause(ctx, stage, value)?,
            Clause::Call { op, .. } if Self::is_aggregate_name(op) => Self::describe(ctx, stage, clause)?.display_name,
            Clause::Call { op, args } => {
                let mut parts = Vec::with_capacity(args.len());
                for arg in args {
                    parts.push(Self::display_clause(ctx, stage, arg)?);
                }
                if INFIX_OPERATORS.contains(&op.as_str()) && parts.len() >= 2 {
                    parts.join(&format!(" {op} "))
                } else {
                    format!("{op}({})", parts.join(", "))
                }
            }
            other => other.to_string(),
        })
    }

    /// Display name with temporal bucket and binning suffixes, e.g. `Created At: Month`.
    pub fn long_display_name(col: &ColumnMetadata) -> String {
        let mut display = col.display_name.clone();
        if let Some(unit) = col.unit.filter(|unit| *unit != TemporalUnit::Default) {
            display = format!("{display}: {}", unit.display_name());
        }
        if let Some(binning) = &col.binning_info {
            display = format!("{display}: {}", binning.display_name());
        }
        display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogField, MemoryCatalog, SimpleHumanizer};
    use serde_json::json;

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with_field(CatalogField::new(1, "total", "Total", BaseType::Decimal))
            .with_field(CatalogField::new(2, "quantity", "Quantity", BaseType::Integer))
            .with_field(CatalogField::new(3, "created_at", "Created At", BaseType::DateTime))
            .with_field(CatalogField::new(4, "product_id", "Product ID", BaseType::Integer))
            .with_field(CatalogField::new(5, "price", "Price", BaseType::Float))
    }

    fn resolve(json: serde_json::Value) -> ColumnMetadata {
        let catalog = catalog();
        let ctx = ResolveContext::new(&catalog, &SimpleHumanizer);
        let aggregation = Aggregation::parse(&json, "/a/0").expect("aggregation");
        AggregateResolver::resolve(&ctx, &Stage::from_table(1), 0, &aggregation).expect("resolve")
    }

    #[test]
    fn count_without_argument() {
        let col = resolve(json!(["count"]));
        assert_eq!(col.name, "count");
        assert_eq!(col.display_name, "Count");
        assert_eq!(col.base_type, BaseType::BigInteger);
        assert_eq!(col.source, Some(ColumnSource::Aggregation));
        assert_eq!(col.field_ref, Some(ColumnRef::Aggregation(0)));
        assert_eq!(col.aggregation_index, Some(0));
    }

    #[test]
    fn sum_takes_argument_type() {
        let col = resolve(json!(["sum", ["field", 2, null]]));
        assert_eq!(col.name, "sum");
        assert_eq!(col.display_name, "Sum of Quantity");
        assert_eq!(col.base_type, BaseType::Integer);
    }

    #[test]
    fn average_is_float() {
        let col = resolve(json!(["avg", ["field", 2, null]]));
        assert_eq!(col.display_name, "Average of Quantity");
        assert_eq!(col.base_type, BaseType::Float);
    }

    #[test]
    fn conditional_aggregations() {
        assert_eq!(resolve(json!(["count-where", [">", ["field", 2, null], 1]])).display_name, "Count of rows matching condition");
        assert_eq!(resolve(json!(["share", [">", ["field", 2, null], 1]])).display_name, "Percentage of rows matching condition");
        let sum_where = resolve(json!(["sum-where", ["field", 1, null], [">", ["field", 2, null], 1]]));
        assert_eq!(sum_where.name, "sum-where");
        assert_eq!(sum_where.display_name, "Sum of Total matching condition");
        assert_eq!(sum_where.base_type, BaseType::Decimal);
    }

    #[test]
    fn only_share_is_described_as_a_percentage() {
        let ops = [
            "count", "cum-count", "distinct", "count-where", "sum", "cum-sum", "sum-where", "min", "max", "avg",
            "median", "stddev", "var",
        ];
        for op in ops {
            let col = resolve(json!([op, ["field", 2, null]]));
            assert!(!col.display_name.starts_with("Percentage"), "{op} described as {}", col.display_name);
            assert_ne!(col.name, "share");
        }
        assert_eq!(resolve(json!(["share", [">", ["field", 2, null], 1]])).name, "share");
    }

    #[test]
    fn long_style_includes_bucket_and_join_qualifier() {
        let bucketed = resolve(json!(["min", ["field", 3, {"temporal-unit": "month"}]]));
        assert_eq!(bucketed.display_name, "Min of Created At: Month");
        assert_eq!(bucketed.base_type, BaseType::DateTime);
        assert_eq!(bucketed.unit, None);

        let qualified = resolve(json!(["max", ["field", 5, {"source-field": 4}]]));
        assert_eq!(qualified.display_name, "Max of Product → Price");
    }

    #[test]
    fn aggregation_options_override_names() {
        let col = resolve(json!(["aggregation-options", ["sum", ["field", 1, null]], {"name": "revenue", "display-name": "Revenue"}]));
        assert_eq!(col.name, "revenue");
        assert_eq!(col.display_name, "Revenue");
        assert_eq!(col.base_type, BaseType::Decimal);
    }

    #[test]
    fn arbitrary_expressions_are_rendered() {
        let col = resolve(json!(["+", ["sum", ["field", 1, null]], ["count"]]));
        assert_eq!(col.name, "expression");
        assert_eq!(col.display_name, "Sum of Total + Count");
        assert_eq!(col.base_type, BaseType::Float);
    }
}
