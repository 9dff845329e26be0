use tracing::trace;

use crate::{
    catalog::BaseType,
    parser::{
        analyzer::{AnnotateError, AnnotateResult, ColumnMetadata, Ident, JoinResolver, ResolveContext, StageColumns},
        ast::{ColumnRef, FieldId, FieldRef, Join, Stage},
    },
};

/// Longest parent chain followed for nested catalog fields.
const MAX_PARENT_DEPTH: usize = 32;

pub struct FieldRefResolver;

impl FieldRefResolver {
    /// Column descriptor for a `["field", ...]` reference as seen from `stage`.
    pub fn resolve(ctx: &ResolveContext, stage: &Stage, field: &FieldRef) -> AnnotateResult<ColumnMetadata> {
        let join = match &field.options.join_alias {
            Some(alias) => Some(JoinResolver::resolve(stage, alias)?),
            None => None,
        };
        let join_at_current_level = join.is_some_and(|j| stage.declares_join(&j.alias));

        let mut col = match &field.id {
            FieldId::Id(id) => Self::catalog_column(ctx, *id)?,
            FieldId::Name(name) => Self::named_column(ctx, stage, join, name)?,
        };
        trace!(field = %field.id, name = %col.name, "resolved field reference");

        col.field_ref = Some(ColumnRef::Field(field.without_namespaced()));
        if col.base_type.is_wildcard() {
            if let Some(base_type) = field.options.base_type {
                col.base_type = base_type;
            }
        }
        col.options.extend(field.options.namespaced.iter().map(|(k, v)| (k.clone(), v.clone())));
        if field.options.binning.is_some() {
            col.binning_info = field.options.binning.clone();
        }
        if field.options.temporal_unit.is_some() {
            col.unit = field.options.temporal_unit;
        }

        match join {
            Some(join) => Self::qualify_joined(ctx, join, field, join_at_current_level, &mut col)?,
            None => {
                if let Some(fk_field_id) = field.options.source_field {
                    Self::qualify_implicit(ctx, fk_field_id, &mut col)?;
                }
            }
        }

        // a saved query's internal joins are not addressable from outside it
        if stage.source_card.is_some() && !join_at_current_level {
            if let Some(ColumnRef::Field(emitted)) = &mut col.field_ref {
                emitted.options.join_alias = None;
            }
        }
        Ok(col)
    }

    fn catalog_column(ctx: &ResolveContext, id: i64) -> AnnotateResult<ColumnMetadata> {
        let field = ctx.field(id)?;
        let mut col = ColumnMetadata::from_catalog(&field);

        let mut parent_id = field.parent_id;
        let mut hops = 0;
        while let Some(pid) = parent_id {
            hops += 1;
            if hops > MAX_PARENT_DEPTH {
                return Err(AnnotateError::unresolvable(
                    format!("field {id}"),
                    format!("parent chain longer than {MAX_PARENT_DEPTH} fields"),
                ));
            }
            let parent = ctx.field(pid)?;
            col.name = format!("{}.{}", parent.name, col.name);
            parent_id = parent.parent_id;
        }
        Ok(col)
    }

    fn named_column(
        ctx: &ResolveContext,
        stage: &Stage,
        join: Option<&Join>,
        name: &str,
    ) -> AnnotateResult<ColumnMetadata> {
        let found = match join {
            Some(join) => Self::find_named(&StageColumns::visible(ctx, &join.stage)?, name),
            None => match Self::find_named(&stage.source_metadata, name) {
                Some(col) => Some(col),
                None => match stage.source_stage() {
                    Some(source) => Self::find_named(&StageColumns::visible(ctx, source)?, name),
                    None => None,
                },
            },
        };

        Ok(match found {
            Some(mut col) => {
                // re-selected from another stage: its provenance there does not carry over
                col.field_ref = None;
                col.source = None;
                col.aggregation_index = None;
                col
            }
            None => ColumnMetadata::new(name, &ctx.humanize(name), BaseType::Wildcard),
        })
    }

    fn find_named(columns: &[ColumnMetadata], name: &str) -> Option<ColumnMetadata> {
        columns.iter().find(|c| c.name == name).cloned()
    }

    fn qualify_joined(
        ctx: &ResolveContext,
        join: &Join,
        field: &FieldRef,
        join_at_current_level: bool,
        col: &mut ColumnMetadata,
    ) -> AnnotateResult<()> {
        col.source_alias = Some(join.alias.clone());

        let qualifier = match join.fk_field_id.or(field.options.source_field) {
            Some(fk_field_id) => JoinResolver::fk_qualifier(ctx, fk_field_id)?,
            None => join.alias.clone(),
        };
        col.display_name = JoinResolver::qualified_display_name(&qualifier, &col.display_name);

        if join_at_current_level || matches!(field.id, FieldId::Id(_)) {
            if let (Some(join_ident), Some(ident)) = (&join.ident, &col.ident) {
                col.ident = Some(Ident::explicitly_joined(join_ident, ident));
            }
        }

        if let Some(fk_field_id) = join.fk_field_id {
            col.fk_field_id = Some(fk_field_id);
            if let Some(ColumnRef::Field(emitted)) = &mut col.field_ref {
                emitted.options.join_alias = None;
                emitted.options.source_field = Some(fk_field_id);
            }
        }
        Ok(())
    }

    /// Field reached through a foreign key with no join declared for it.
    fn qualify_implicit(ctx: &ResolveContext, fk_field_id: i64, col: &mut ColumnMetadata) -> AnnotateResult<()> {
        let fk = ctx.field(fk_field_id)?;
        if let (Some(fk_ident), Some(ident)) = (&fk.ident, &col.ident) {
            col.ident = Some(Ident::implicitly_joined(fk_ident, ident));
        }
        col.fk_field_id = Some(fk_field_id);
        col.display_name = JoinResolver::qualified_display_name(
            &JoinResolver::strip_id_suffix(&fk.display_name),
            &col.display_name,
        );
        Ok(())
    }
}
