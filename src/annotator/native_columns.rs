use serde_json::Value;
use tracing::warn;

use crate::{
    annotator::{best_type, ExecutionResult, MetadataMerger, RawColumn},
    catalog::BaseType,
    parser::{
        analyzer::{
            AnnotateError, AnnotateResult, ColumnMetadata, ColumnSource, FieldRefResolver, Ident, ResolveContext,
            UniqueNameGenerator,
        },
        ast::{ColumnRef, FieldOptions, FieldRef, Stage},
    },
};

/// Columns of a native query, built from what the driver returned.
pub struct NativeColumns;

impl NativeColumns {
    pub fn build(ctx: &ResolveContext, results: &ExecutionResult) -> AnnotateResult<Vec<ColumnMetadata>> {
        if let Some(width) = results.row_width() {
            if width != results.columns.len() {
                return Err(AnnotateError::SchemaMismatch {
                    expected_count: results.columns.len(),
                    actual_count: width,
                    expected_columns: results.column_names(),
                    actual_columns: Vec::new(),
                });
            }
        }

        let first_row = results.rows.first();
        let mut names = UniqueNameGenerator::new();
        results
            .columns
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let sample = first_row.and_then(|row| row.get(i));
                Self::column(ctx, raw, sample, names.unique_name(&raw.name))
            })
            .collect()
    }

    fn column(
        ctx: &ResolveContext,
        raw: &RawColumn,
        sample: Option<&Value>,
        unique_name: String,
    ) -> AnnotateResult<ColumnMetadata> {
        if let Some(id) = raw.id {
            let catalog_col = FieldRefResolver::resolve(ctx, &Stage::default(), &FieldRef::by_id(id))?;
            let mut col = MetadataMerger::merge_executed_column(catalog_col, raw);
            if col.ident.is_none() {
                col.ident = Some(Ident::native(&unique_name));
            }
            col.name = unique_name;
            col.source = Some(ColumnSource::Native);
            return Ok(col);
        }

        let base_type = best_type(&[raw.base_type, sample.map(BaseType::of_value)]);
        let mut col = ColumnMetadata::new(&unique_name, &raw.name, base_type).with_source(ColumnSource::Native);
        col.effective_type = raw.effective_type.or((!base_type.is_wildcard()).then_some(base_type));
        col.ident = Some(Ident::native(&unique_name));

        if unique_name.trim().is_empty() {
            warn!("native column has a blank name, leaving it without a field ref");
        } else {
            let options = FieldOptions { base_type: Some(base_type), ..FieldOptions::default() };
            col.field_ref = Some(ColumnRef::by_name(&unique_name, options));
        }

        if let Some(database_type) = &raw.database_type {
            col.extra.insert("database_type".into(), Value::String(database_type.clone()));
        }
        for (key, value) in &raw.extra {
            col.extra.insert(key.clone(), value.clone());
        }
        Ok(col)
    }
}
