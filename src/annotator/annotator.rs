use tracing::{debug, trace};

use crate::{
    annotator::{AnnotateConfig, AnnotatedResult, ExecutionResult, MetadataMerger, NativeColumns, QueryRunner},
    catalog::{Catalog, Humanizer, SimpleHumanizer},
    parser::{
        analyzer::{
            AnnotateError, AnnotateResult, ColumnMetadata, ColumnSource, Ident, NameDedup, ResolveContext, StageColumns,
        },
        ast::{Query, Stage, StageSource},
    },
};

/// Computes the result columns of a query and attaches them to its execution result.
pub struct Annotator<'a> {
    catalog: &'a dyn Catalog,
    humanizer: &'a dyn Humanizer,
    config: AnnotateConfig,
}

impl<'a> Annotator<'a> {
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self { catalog, humanizer: &SimpleHumanizer, config: AnnotateConfig::default() }
    }

    pub fn with_humanizer(mut self, humanizer: &'a dyn Humanizer) -> Self {
        self.humanizer = humanizer;
        self
    }

    pub fn with_config(mut self, config: AnnotateConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AnnotateConfig {
        &self.config
    }

    fn context(&self) -> ResolveContext<'a> {
        ResolveContext::new(self.catalog, self.humanizer)
    }

    /// Replace the driver's columns with computed descriptors; rows and other keys pass through.
    pub fn annotate(&self, query: &Query, results: ExecutionResult) -> AnnotateResult<AnnotatedResult> {
        let columns = self.column_info(query, &results)?;
        Self::check_row_width(&columns, &results)?;
        Ok(AnnotatedResult { columns, rows: results.rows, extra: results.extra })
    }

    pub fn execute_and_annotate(&self, query: &Query, runner: &dyn QueryRunner) -> AnnotateResult<AnnotatedResult> {
        let results = runner.execute(query).map_err(AnnotateError::Execution)?;
        self.annotate(query, results)
    }

    /// Structural columns of a single stage, without execution results.
    pub fn columns_for_stage(&self, stage: &Stage) -> AnnotateResult<Vec<ColumnMetadata>> {
        self.check_depth(stage)?;
        StageColumns::build(&self.context(), stage)
    }

    pub fn column_info(&self, query: &Query, results: &ExecutionResult) -> AnnotateResult<Vec<ColumnMetadata>> {
        let ctx = self.context();
        match query {
            Query::Native(_) => NativeColumns::build(&ctx, results),
            Query::Structural(stage) => {
                self.check_depth(stage)?;
                let columns = self.stage_columns(&ctx, stage, Some(results), 1)?;
                Ok(NameDedup::dedupe(MetadataMerger::merge_executed(columns, &results.columns)))
            }
        }
    }

    fn check_depth(&self, stage: &Stage) -> AnnotateResult<()> {
        let depth = stage.depth();
        if depth > self.config.max_stage_depth {
            return Err(AnnotateError::NestingTooDeep { depth, max: self.config.max_stage_depth });
        }
        Ok(())
    }

    /// `results` is only passed along while every stage above passes its source through,
    /// because only then do the driver's columns describe the inner stage.
    fn stage_columns(
        &self,
        ctx: &ResolveContext,
        stage: &Stage,
        results: Option<&ExecutionResult>,
        depth: usize,
    ) -> AnnotateResult<Vec<ColumnMetadata>> {
        trace!(depth, "annotating stage");
        let built = StageColumns::build(ctx, stage)?;
        let mut columns = if built.is_empty() {
            self.passthrough_columns(ctx, stage, results, depth)?
        } else {
            MetadataMerger::merge_source_metadata(built, &stage.source_metadata)
        };

        if stage.is_model() {
            columns = self.model_columns(stage, columns)?;
        }
        Ok(NameDedup::dedupe(columns))
    }

    fn passthrough_columns(
        &self,
        ctx: &ResolveContext,
        stage: &Stage,
        results: Option<&ExecutionResult>,
        depth: usize,
    ) -> AnnotateResult<Vec<ColumnMetadata>> {
        let source_columns = match &stage.source {
            StageSource::Query(query) => match &**query {
                Query::Native(_) => match results {
                    Some(results) if !results.columns.is_empty() => NativeColumns::build(ctx, results)?,
                    _ => Vec::new(),
                },
                Query::Structural(source) => self
                    .stage_columns(ctx, source, results, depth + 1)?
                    .into_iter()
                    .map(StageColumns::reselected)
                    .collect(),
            },
            // no table listing in the catalog: the driver's columns are the table's columns
            StageSource::Table(_) => match results {
                Some(results) if !results.columns.is_empty() => NativeColumns::build(ctx, results)?
                    .into_iter()
                    .map(|col| col.with_source(ColumnSource::Fields))
                    .collect(),
                _ => Vec::new(),
            },
            StageSource::None => Vec::new(),
        };
        debug!(
            depth,
            source_columns = source_columns.len(),
            declared = stage.source_metadata.len(),
            "stage selects nothing, passing its source through"
        );

        if source_columns.is_empty() {
            return Ok(stage.source_metadata.clone());
        }
        Ok(MetadataMerger::overlay_source_metadata(source_columns, &stage.source_metadata))
    }

    /// Scope idents of columns coming out of a model to that model.
    fn model_columns(&self, stage: &Stage, columns: Vec<ColumnMetadata>) -> AnnotateResult<Vec<ColumnMetadata>> {
        let entity_id = stage.source_card.as_ref().and_then(|card| card.entity_id.as_deref());
        let Some(entity_id) = entity_id else {
            if self.config.production {
                debug!("model stage has no entity id, leaving idents as they are");
                return Ok(columns);
            }
            return Err(AnnotateError::ConsistencyCheck("model stage has no entity id".into()));
        };

        debug!(entity_id, columns = columns.len(), "re-deriving idents for model columns");
        columns
            .into_iter()
            .map(|mut col| {
                let Some(ident) = col.ident.take() else {
                    if self.config.production {
                        return Ok(col);
                    }
                    return Err(AnnotateError::ConsistencyCheck(format!("column `{}` has no ident", col.name)));
                };
                col.ident = Some(if col.owns_ident() { ident } else { Ident::model(entity_id, &ident) });
                Ok(col)
            })
            .collect()
    }

    fn check_row_width(columns: &[ColumnMetadata], results: &ExecutionResult) -> AnnotateResult<()> {
        match results.row_width() {
            Some(width) if width != columns.len() => Err(AnnotateError::SchemaMismatch {
                expected_count: columns.len(),
                actual_count: width,
                expected_columns: columns.iter().map(|c| c.name.clone()).collect(),
                actual_columns: results.column_names(),
            }),
            _ => Ok(()),
        }
    }
}
