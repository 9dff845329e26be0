use std::{cell::RefCell, collections::HashMap};

use crate::{
    catalog::{Catalog, CatalogField, Humanizer},
    parser::{
        analyzer::{AnnotateError, AnnotateResult, ColumnMetadata},
        ast::Stage,
    },
};

/// Collaborators shared by every resolver during one annotation pass.
///
/// A context must not outlive the query it resolves: visible columns are
/// remembered per stage address for the length of the pass.
pub struct ResolveContext<'a> {
    pub catalog: &'a dyn Catalog,
    pub humanizer: &'a dyn Humanizer,
    visible: RefCell<HashMap<usize, Vec<ColumnMetadata>>>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(catalog: &'a dyn Catalog, humanizer: &'a dyn Humanizer) -> Self {
        Self { catalog, humanizer, visible: RefCell::new(HashMap::new()) }
    }

    pub fn field(&self, id: i64) -> AnnotateResult<CatalogField> {
        self.catalog
            .field(id)
            .map_err(|e| AnnotateError::unresolvable(format!("field {id}"), e.to_string()))
    }

    pub fn humanize(&self, raw: &str) -> String {
        self.humanizer.humanize(raw)
    }

    pub fn visible_columns(&self, stage: &Stage) -> Option<Vec<ColumnMetadata>> {
        self.visible.borrow().get(&Self::stage_key(stage)).cloned()
    }

    pub fn remember_visible_columns(&self, stage: &Stage, columns: &[ColumnMetadata]) {
        self.visible.borrow_mut().insert(Self::stage_key(stage), columns.to_vec());
    }

    fn stage_key(stage: &Stage) -> usize {
        std::ptr::from_ref(stage) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BaseType, MemoryCatalog, SimpleHumanizer};

    #[test]
    fn visible_columns_are_remembered_per_stage() {
        let catalog = MemoryCatalog::new();
        let ctx = ResolveContext::new(&catalog, &SimpleHumanizer);
        let first = Stage::from_table(1);
        let second = Stage::from_table(1);

        ctx.remember_visible_columns(&first, &[ColumnMetadata::new("total", "Total", BaseType::Decimal)]);

        let names: Vec<_> = ctx.visible_columns(&first).unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["total"]);
        assert!(ctx.visible_columns(&second).is_none());
    }
}
