use tracing::trace;

use crate::parser::{
    analyzer::{
        AggregateResolver, AnnotateError, AnnotateResult, ColumnMetadata, ColumnSource, ExpressionResolver,
        FieldRefResolver, NameDedup, ResolveContext,
    },
    ast::{Clause, ColumnRef, FieldId, FieldOptions, Stage},
};

/// Structural columns of one stage: breakouts, then aggregations, then fields.
pub struct StageColumns;

impl StageColumns {
    /// Empty when the stage selects nothing itself; the caller then passes its source through.
    pub fn build(ctx: &ResolveContext, stage: &Stage) -> AnnotateResult<Vec<ColumnMetadata>> {
        trace!(
            breakouts = stage.breakouts.len(),
            aggregations = stage.aggregations.len(),
            fields = stage.fields.len(),
            "building stage columns"
        );
        let mut columns = Vec::with_capacity(stage.breakouts.len() + stage.aggregations.len() + stage.fields.len());

        for breakout in &stage.breakouts {
            let mut col = Self::column_for_clause(ctx, stage, &breakout.clause)?;
            col.source = Some(ColumnSource::Breakout);
            if breakout.ident.is_some() {
                col.ident = breakout.ident.clone();
            }
            columns.push(col);
        }

        for (index, aggregation) in stage.aggregations.iter().enumerate() {
            columns.push(AggregateResolver::resolve(ctx, stage, index, aggregation)?);
        }

        for clause in &stage.fields {
            let mut col = Self::column_for_clause(ctx, stage, clause)?;
            col.source = Some(ColumnSource::Fields);
            columns.push(col);
        }

        Ok(NameDedup::dedupe(columns))
    }

    pub fn column_for_clause(ctx: &ResolveContext, stage: &Stage, clause: &Clause) -> AnnotateResult<ColumnMetadata> {
        match clause {
            Clause::Field(field) => FieldRefResolver::resolve(ctx, stage, field),
            Clause::Expression { name, options } => ExpressionResolver::resolve(ctx, stage, name, options),
            Clause::AggregationRef(index) => match stage.aggregations.get(*index) {
                Some(aggregation) => AggregateResolver::resolve(ctx, stage, *index, aggregation),
                None => Err(AnnotateError::unresolvable(
                    format!("aggregation {index}"),
                    format!("stage declares {} aggregations", stage.aggregations.len()),
                )),
            },
            other => Err(AnnotateError::unresolvable(
                other,
                "only field, expression and aggregation references can be selected",
            )),
        }
    }

    /// Columns a stage exposes to the stage reading from it, without execution results.
    ///
    /// Built once per stage and pass; later lookups come from the context.
    pub fn visible(ctx: &ResolveContext, stage: &Stage) -> AnnotateResult<Vec<ColumnMetadata>> {
        if let Some(columns) = ctx.visible_columns(stage) {
            return Ok(columns);
        }
        let columns = Self::exposed(ctx, stage)?;
        ctx.remember_visible_columns(stage, &columns);
        Ok(columns)
    }

    fn exposed(ctx: &ResolveContext, stage: &Stage) -> AnnotateResult<Vec<ColumnMetadata>> {
        let built = Self::build(ctx, stage)?;
        if !built.is_empty() {
            return Ok(built);
        }
        if !stage.source_metadata.is_empty() {
            return Ok(stage.source_metadata.clone());
        }
        match stage.source_stage() {
            Some(source) => Ok(Self::visible(ctx, source)?.into_iter().map(Self::reselected).collect()),
            None => Ok(Vec::new()),
        }
    }

    /// The column as re-selected by the stage wrapping the one that produced it.
    ///
    /// Catalog field refs stay valid one level out; everything else is addressed
    /// by its unique name from then on.
    pub fn reselected(mut col: ColumnMetadata) -> ColumnMetadata {
        col.field_ref = match col.field_ref.take() {
            Some(ColumnRef::Field(field)) if matches!(field.id, FieldId::Id(_)) => Some(ColumnRef::Field(field)),
            _ => {
                let options = FieldOptions {
                    base_type: (!col.base_type.is_wildcard()).then_some(col.base_type),
                    ..FieldOptions::default()
                };
                Some(ColumnRef::by_name(&col.name, options))
            }
        };
        col.source = Some(ColumnSource::Fields);
        col.aggregation_index = None;
        col.expression_name = None;
        col
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{BaseType, CatalogField, MemoryCatalog, SimpleHumanizer},
        parser::ast::{Aggregation, FieldRef, Query},
    };
    use serde_json::json;

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with_field(CatalogField::new(1, "category", "Category", BaseType::Text))
            .with_field(CatalogField::new(2, "price", "Price", BaseType::Float))
    }

    #[test]
    fn order_is_breakouts_aggregations_fields() {
        let catalog = catalog();
        let ctx = ResolveContext::new(&catalog, &SimpleHumanizer);
        let stage = Stage::from_table(1)
            .with_field(Clause::Field(FieldRef::by_id(2)))
            .with_aggregation(Aggregation::new(Clause::call("count", vec![])))
            .with_breakout(Clause::Field(FieldRef::by_id(1)));

        let cols = StageColumns::build(&ctx, &stage).unwrap();
        let summary: Vec<_> = cols.iter().map(|c| (c.name.as_str(), c.source)).collect();
        assert_eq!(
            summary,
            vec![
                ("category", Some(ColumnSource::Breakout)),
                ("count", Some(ColumnSource::Aggregation)),
                ("price", Some(ColumnSource::Fields)),
            ]
        );
    }

    #[test]
    fn repeated_selections_are_deduplicated() {
        let catalog = catalog();
        let ctx = ResolveContext::new(&catalog, &SimpleHumanizer);
        let stage = Stage::from_table(1)
            .with_aggregation(Aggregation::new(Clause::call("count", vec![])))
            .with_aggregation(Aggregation::new(Clause::call("count", vec![])));

        let names: Vec<_> = StageColumns::build(&ctx, &stage).unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["count", "count_2"]);
    }

    #[test]
    fn empty_stage_builds_nothing() {
        let catalog = catalog();
        let ctx = ResolveContext::new(&catalog, &SimpleHumanizer);
        assert!(StageColumns::build(&ctx, &Stage::from_table(1)).unwrap().is_empty());
    }

    #[test]
    fn selecting_a_missing_aggregation_fails() {
        let catalog = catalog();
        let ctx = ResolveContext::new(&catalog, &SimpleHumanizer);
        let stage = Stage::from_table(1).with_field(Clause::AggregationRef(3));
        let err = StageColumns::build(&ctx, &stage).unwrap_err();
        assert!(matches!(err, AnnotateError::UnresolvableReference { ref reference, .. } if reference == "aggregation 3"));
    }

    #[test]
    fn visible_columns_pass_through_and_rename_refs() {
        let catalog = catalog();
        let ctx = ResolveContext::new(&catalog, &SimpleHumanizer);
        let inner = Stage::from_table(1)
            .with_breakout(Clause::Field(FieldRef::by_id(1)))
            .with_aggregation(Aggregation::new(Clause::call("count", vec![])));
        let outer = Stage::from_query(Query::Structural(inner));

        let cols = StageColumns::visible(&ctx, &outer).unwrap();
        assert_eq!(serde_json::to_value(&cols[0].field_ref).unwrap(), json!(["field", 1, null]));
        assert_eq!(
            serde_json::to_value(&cols[1].field_ref).unwrap(),
            json!(["field", "count", {"base-type": "type/BigInteger"}])
        );
        assert!(cols.iter().all(|c| c.source == Some(ColumnSource::Fields)));
    }

    #[test]
    fn deep_by_name_chains_resolve_each_stage_once() {
        let catalog = catalog();
        let ctx = ResolveContext::new(&catalog, &SimpleHumanizer);
        let mut stage = Stage::from_table(1)
            .with_field(Clause::Field(FieldRef::by_id(1)))
            .with_field(Clause::Field(FieldRef::by_id(2)));
        for _ in 0..30 {
            stage = Stage::from_query(Query::Structural(stage))
                .with_field(Clause::Field(FieldRef::by_name("category")))
                .with_field(Clause::Field(FieldRef::by_name("price")))
                .with_field(Clause::Field(FieldRef::by_name("category")));
        }

        let cols = StageColumns::build(&ctx, &stage).unwrap();
        let names: Vec<_> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["category", "price", "category_2"]);
        assert_eq!(cols[1].base_type, BaseType::Float);
    }
}
