use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Temporal bucketing applied to a date/time column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemporalUnit {
    /// no explicit bucketing; downstream stages may backfill the real unit
    Default,
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
    MinuteOfHour,
    HourOfDay,
    DayOfWeek,
    DayOfMonth,
    DayOfYear,
    WeekOfYear,
    MonthOfYear,
    QuarterOfYear,
}

impl TemporalUnit {
    pub fn parse(text: &str) -> Option<TemporalUnit> {
        serde_json::from_value(Value::String(text.to_string())).ok()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TemporalUnit::Default => "Default",
            TemporalUnit::Millisecond => "Millisecond",
            TemporalUnit::Second => "Second",
            TemporalUnit::Minute => "Minute",
            TemporalUnit::Hour => "Hour",
            TemporalUnit::Day => "Day",
            TemporalUnit::Week => "Week",
            TemporalUnit::Month => "Month",
            TemporalUnit::Quarter => "Quarter",
            TemporalUnit::Year => "Year",
            TemporalUnit::MinuteOfHour => "Minute of hour",
            TemporalUnit::HourOfDay => "Hour of day",
            TemporalUnit::DayOfWeek => "Day of week",
            TemporalUnit::DayOfMonth => "Day of month",
            TemporalUnit::DayOfYear => "Day of year",
            TemporalUnit::WeekOfYear => "Week of year",
            TemporalUnit::MonthOfYear => "Month of year",
            TemporalUnit::QuarterOfYear => "Quarter of year",
        }
    }
}
