use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::{
    analyzer::{AnnotateError, AnnotateResult, ResolveContext},
    ast::{Join, Stage},
};

static ID_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+id$").unwrap());

pub struct JoinResolver;

impl JoinResolver {
    /// Find a join by alias in `stage`, then in its source stages, innermost last.
    pub fn find<'s>(stage: &'s Stage, alias: &str) -> Option<&'s Join> {
        let mut current = Some(stage);
        while let Some(s) = current {
            if let Some(join) = s.joins.iter().find(|j| j.alias == alias) {
                return Some(join);
            }
            current = s.source_stage();
        }
        None
    }

    pub fn resolve<'s>(stage: &'s Stage, alias: &str) -> AnnotateResult<&'s Join> {
        Self::find(stage, alias).ok_or_else(|| {
            let known: Vec<&str> = Self::visible_aliases(stage);
            AnnotateError::unresolvable(
                format!("join alias \"{alias}\""),
                format!("no such join; visible aliases: [{}]", known.join(", ")),
            )
        })
    }

    fn visible_aliases(stage: &Stage) -> Vec<&str> {
        let mut aliases = Vec::new();
        let mut current = Some(stage);
        while let Some(s) = current {
            aliases.extend(s.joins.iter().map(|j| j.alias.as_str()));
            current = s.source_stage();
        }
        aliases
    }

    /// Display qualifier of a foreign key: its display name without a trailing "ID".
    pub fn fk_qualifier(ctx: &ResolveContext, fk_field_id: i64) -> AnnotateResult<String> {
        let fk = ctx.field(fk_field_id)?;
        Ok(Self::strip_id_suffix(&fk.display_name))
    }

    pub fn strip_id_suffix(display_name: &str) -> String {
        ID_SUFFIX.replace(display_name, "").into_owned()
    }

    pub fn qualified_display_name(qualifier: &str, display_name: &str) -> String {
        format!("{qualifier} → {display_name}")
    }
}
