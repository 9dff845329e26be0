use crate::{
    catalog::BaseType,
    parser::{
        analyzer::{AnnotateError, AnnotateResult, ColumnMetadata, ResolveContext, TypeInference},
        ast::{ColumnRef, FieldOptions, Stage},
    },
};

pub struct ExpressionResolver;

impl ExpressionResolver {
    /// Column for `["expression", name]`, typed by inferring the named clause.
    pub fn resolve(
        ctx: &ResolveContext,
        stage: &Stage,
        name: &str,
        options: &FieldOptions,
    ) -> AnnotateResult<ColumnMetadata> {
        let named = stage.expressions.get(name).ok_or_else(|| {
            AnnotateError::unresolvable(format!("expression \"{name}\""), "no expression with this name in the stage")
        })?;

        let mut col = ColumnMetadata::new(name, name, BaseType::Wildcard);
        TypeInference::infer(ctx, stage, &named.clause)?.apply_to(&mut col);

        let mut emitted = options.clone();
        emitted.namespaced.clear();
        col.field_ref = Some(ColumnRef::Expression { name: name.to_string(), options: emitted });
        col.expression_name = Some(name.to_string());
        col.ident = named.ident.clone();
        if options.temporal_unit.is_some() {
            col.unit = options.temporal_unit;
        }
        if options.binning.is_some() {
            col.binning_info = options.binning.clone();
        }
        Ok(col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{BaseType, CatalogField, MemoryCatalog, SimpleHumanizer},
        parser::ast::{Clause, FieldRef},
    };

    #[test]
    fn expression_column_is_named_after_the_expression() {
        let catalog = MemoryCatalog::new().with_field(CatalogField::new(1, "price", "Price", BaseType::Decimal));
        let ctx = ResolveContext::new(&catalog, &SimpleHumanizer);
        let stage = Stage::from_table(1)
            .with_expression("double_price", Clause::call("*", vec![Clause::Field(FieldRef::by_id(1)), Clause::int(2)]));

        let col = ExpressionResolver::resolve(&ctx, &stage, "double_price", &FieldOptions::default()).unwrap();
        assert_eq!(col.name, "double_price");
        assert_eq!(col.display_name, "double_price");
        assert_eq!(col.base_type, BaseType::Float);
        assert_eq!(col.expression_name.as_deref(), Some("double_price"));
        assert_eq!(col.field_ref, Some(ColumnRef::expression("double_price")));
    }

    #[test]
    fn missing_expression_is_unresolvable() {
        let catalog = MemoryCatalog::new();
        let ctx = ResolveContext::new(&catalog, &SimpleHumanizer);
        let err = ExpressionResolver::resolve(&ctx, &Stage::from_table(1), "ghost", &FieldOptions::default()).unwrap_err();
        assert!(matches!(err, AnnotateError::UnresolvableReference { .. }));
    }
}
