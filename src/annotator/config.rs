use serde::Deserialize;

use crate::parser::ast::DEFAULT_MAX_STAGE_DEPTH;

/// Knobs threaded into every annotation pass.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnnotateConfig {
    /// When false, metadata consistency checks fail the pass instead of being skipped.
    pub production: bool,
    pub max_stage_depth: usize,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self { production: true, max_stage_depth: DEFAULT_MAX_STAGE_DEPTH }
    }
}

impl AnnotateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn production() -> Self {
        Self { production: true, ..Self::default() }
    }

    pub fn development() -> Self {
        Self { production: false, ..Self::default() }
    }

    pub fn with_max_stage_depth(mut self, max_stage_depth: usize) -> Self {
        self.max_stage_depth = max_stage_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_to_production() {
        let config = AnnotateConfig::new();
        assert!(config.production);
        assert_eq!(config.max_stage_depth, 32);
        assert!(!AnnotateConfig::development().production);
    }

    #[test]
    fn deserializes_partial_documents() {
        let config: AnnotateConfig = serde_json::from_value(json!({"production": false})).unwrap();
        assert_eq!(config, AnnotateConfig::development());

        let config: AnnotateConfig = serde_json::from_value(json!({"max_stage_depth": 4})).unwrap();
        assert_eq!(config, AnnotateConfig::production().with_max_stage_depth(4));
    }
}
