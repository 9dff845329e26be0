use crate::parser::{
    analyzer::ColumnMetadata,
    ast::{ColumnRef, FieldId},
};

/// Identity used to pair a column with its declared source metadata.
///
/// Only the parts of a reference that change which column is meant take part;
/// type hints, buckets and namespaced options do not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RefKey {
    Field { id: FieldId, join_alias: Option<String> },
    Expression(String),
    Aggregation(usize),
    /// column without a reference, keyed by its name
    Name(String),
}

impl RefKey {
    pub fn of_ref(column_ref: &ColumnRef) -> Self {
        match column_ref {
            ColumnRef::Field(field) => RefKey::Field {
                id: field.id.clone(),
                join_alias: field.options.join_alias.clone(),
            },
            ColumnRef::Expression { name, .. } => RefKey::Expression(name.clone()),
            ColumnRef::Aggregation(index) => RefKey::Aggregation(*index),
        }
    }

    pub fn of(col: &ColumnMetadata) -> Self {
        match &col.field_ref {
            Some(column_ref) => Self::of_ref(column_ref),
            None => RefKey::Name(col.name.clone()),
        }
    }
}
