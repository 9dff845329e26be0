use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::{
    annotator::RawColumn,
    catalog::BaseType,
    parser::{
        analyzer::{ColumnMetadata, RefKey},
        ast::TemporalUnit,
    },
};

/// Folds declared source metadata and driver-reported metadata into computed columns.
///
/// Precedence per column, lowest first: the computed (structural) column, the
/// declared source metadata matched by reference, then what the driver returned
/// at the same position. None of the steps fail.
pub struct MetadataMerger;

impl MetadataMerger {
    pub fn merge(
        structural: Vec<ColumnMetadata>,
        source_metadata: &[ColumnMetadata],
        executed: &[RawColumn],
    ) -> Vec<ColumnMetadata> {
        let merged = Self::merge_source_metadata(structural, source_metadata);
        Self::merge_executed(merged, executed)
    }

    /// Pair columns with declared source metadata by reference identity.
    ///
    /// Skipped entirely when the two lists differ in length.
    pub fn merge_source_metadata(columns: Vec<ColumnMetadata>, source_metadata: &[ColumnMetadata]) -> Vec<ColumnMetadata> {
        if source_metadata.is_empty() {
            return columns;
        }
        if columns.len() != source_metadata.len() {
            debug!(
                columns = columns.len(),
                declared = source_metadata.len(),
                "declared source metadata does not line up, skipping merge"
            );
            return columns;
        }

        let mut by_key: HashMap<RefKey, &ColumnMetadata> = HashMap::with_capacity(source_metadata.len());
        for source in source_metadata {
            by_key.entry(RefKey::of(source)).or_insert(source);
        }

        columns
            .into_iter()
            .map(|col| match by_key.get(&RefKey::of(&col)) {
                Some(source) => Self::merge_source_column(col, source),
                None => col,
            })
            .collect()
    }

    /// Positional variant used when a stage passes its source through untouched.
    pub fn overlay_source_metadata(columns: Vec<ColumnMetadata>, source_metadata: &[ColumnMetadata]) -> Vec<ColumnMetadata> {
        if source_metadata.is_empty() {
            return columns;
        }
        if columns.len() != source_metadata.len() {
            debug!(
                columns = columns.len(),
                declared = source_metadata.len(),
                "declared source metadata does not line up, skipping overlay"
            );
            return columns;
        }
        columns
            .into_iter()
            .zip(source_metadata)
            .map(|(col, source)| Self::merge_source_column(col, source))
            .collect()
    }

    pub fn merge_source_column(mut col: ColumnMetadata, source: &ColumnMetadata) -> ColumnMetadata {
        if !source.display_name.is_empty() {
            col.display_name = source.display_name.clone();
        }
        if !source.base_type.is_wildcard() {
            col.base_type = source.base_type;
        }
        prefer(&mut col.effective_type, &source.effective_type);
        prefer(&mut col.coercion_strategy, &source.coercion_strategy);
        prefer(&mut col.id, &source.id);
        prefer(&mut col.fk_field_id, &source.fk_field_id);
        prefer(&mut col.source_alias, &source.source_alias);
        prefer(&mut col.binning_info, &source.binning_info);
        prefer(&mut col.converted_timezone, &source.converted_timezone);
        if matches!(col.unit, None | Some(TemporalUnit::Default)) && source.unit.is_some() {
            col.unit = source.unit;
        }
        for (key, value) in &source.extra {
            col.extra.insert(key.clone(), value.clone());
        }
        col.ident = Self::merged_ident(&col, source.ident.as_deref());
        col
    }

    /// Overlay driver metadata position by position; columns without a driver counterpart stay as they are.
    pub fn merge_executed(columns: Vec<ColumnMetadata>, executed: &[RawColumn]) -> Vec<ColumnMetadata> {
        if executed.is_empty() {
            return columns;
        }
        if columns.len() != executed.len() {
            debug!(columns = columns.len(), returned = executed.len(), "driver returned a different column count");
        }
        columns
            .into_iter()
            .enumerate()
            .map(|(i, col)| match executed.get(i) {
                Some(raw) => Self::merge_executed_column(col, raw),
                None => col,
            })
            .collect()
    }

    pub fn merge_executed_column(mut col: ColumnMetadata, raw: &RawColumn) -> ColumnMetadata {
        col.effective_type = [raw.effective_type, raw.base_type, col.effective_type, Some(col.base_type)]
            .into_iter()
            .flatten()
            .find(|ty| !ty.is_wildcard());

        if let Some(base_type) = raw.base_type.filter(|ty| !ty.is_wildcard()) {
            col.base_type = base_type;
        }
        prefer(&mut col.id, &raw.id);
        if let Some(database_type) = &raw.database_type {
            col.extra.insert("database_type".into(), Value::String(database_type.clone()));
        }

        let mut driver_ident = None;
        for (key, value) in &raw.extra {
            match (key.as_str(), value) {
                ("ident", Value::String(ident)) => driver_ident = Some(ident.as_str()),
                ("display_name", Value::String(display_name)) if !display_name.is_empty() => {
                    col.display_name = display_name.clone();
                }
                ("name", _) => {}
                _ => {
                    col.extra.insert(key.clone(), value.clone());
                }
            }
        }
        col.ident = Self::merged_ident(&col, driver_ident);
        col
    }

    /// Breakouts and aggregations keep their own ident; everything else takes the other side's.
    fn merged_ident(col: &ColumnMetadata, other: Option<&str>) -> Option<String> {
        if col.owns_ident() && col.ident.is_some() {
            return col.ident.clone();
        }
        other.map(str::to_string).or_else(|| col.ident.clone())
    }
}

fn prefer<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        target.clone_from(value);
    }
}

/// Most specific of the candidate types, wildcard when none is known.
pub fn best_type(candidates: &[Option<BaseType>]) -> BaseType {
    candidates.iter().flatten().copied().find(|ty| !ty.is_wildcard()).unwrap_or_default()
}
