use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::parser::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BinningStrategy {
    Default,
    NumBins,
    BinWidth,
}

/// Numeric binning applied to a grouping key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binning {
    #[serde(rename = "binning_strategy")]
    pub strategy: BinningStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_bins: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_width: Option<f64>,
}

impl Binning {
    /// Read `{"strategy": "num-bins", "num-bins": 10}` style options.
    pub fn parse(value: &Value, path: &str) -> Result<Binning, ParseError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ParseError::new("Binning options must be an object", path, value))?;
        let strategy = obj
            .get("strategy")
            .and_then(Value::as_str)
            .and_then(|s| serde_json::from_value(Value::String(s.to_string())).ok())
            .ok_or_else(|| ParseError::new("Unknown binning strategy", path, value))?;

        Ok(Binning {
            strategy,
            num_bins: obj.get("num-bins").and_then(Value::as_u64).and_then(|n| u32::try_from(n).ok()),
            bin_width: obj.get("bin-width").and_then(Value::as_f64),
        })
    }

    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        let strategy = serde_json::to_value(self.strategy).unwrap_or(Value::Null);
        obj.insert("strategy".into(), strategy);
        if let Some(n) = self.num_bins {
            obj.insert("num-bins".into(), Value::from(n));
        }
        if let Some(w) = self.bin_width {
            obj.insert("bin-width".into(), Value::from(w));
        }
        Value::Object(obj)
    }

    /// Suffix used by long-style display names, e.g. `10 bins`.
    pub fn display_name(&self) -> String {
        match (self.strategy, self.num_bins, self.bin_width) {
            (BinningStrategy::NumBins, Some(n), _) => format!("{n} bins"),
            (BinningStrategy::BinWidth, _, Some(w)) => format!("{w} width"),
            _ => "Auto binned".to_string(),
        }
    }
}
