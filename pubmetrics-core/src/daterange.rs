//! Canonical date-window resolution
//!
//! Both reports share the same four named presets, anchored on "yesterday"
//! so the current, possibly-incomplete day is never included in a window.

use crate::types::DateRange;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Named date-window presets offered by every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    Last30Days,
    Last90Days,
    Last12Months,
    AllTime,
}

impl RangePreset {
    /// All presets, in the order reports offer them.
    pub const ALL: [RangePreset; 4] = [
        RangePreset::Last30Days,
        RangePreset::Last90Days,
        RangePreset::Last12Months,
        RangePreset::AllTime,
    ];

    /// Human-readable option label.
    pub fn label(&self) -> &'static str {
        match self {
            RangePreset::Last30Days => "Last 30 days",
            RangePreset::Last90Days => "Last 90 days",
            RangePreset::Last12Months => "Last 12 months",
            RangePreset::AllTime => "All dates",
        }
    }

    /// Resolve this preset against a reference "today" into an inclusive
    /// calendar window ending on yesterday.
    pub fn resolve(&self, today: NaiveDate) -> DateRange {
        let yesterday = today - Duration::days(1);
        let start = match self {
            RangePreset::Last30Days => today - Duration::days(31),
            RangePreset::Last90Days => today - Duration::days(91),
            RangePreset::Last12Months => today - Duration::days(365),
            RangePreset::AllTime => return DateRange::all_time(),
        };
        DateRange::from_parts(Some(start), Some(yesterday))
    }
}

/// One entry of the `dateRangeOptions` payload sequence.
///
/// All-time is represented by empty strings on both bounds, matching the
/// report endpoint contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeOption {
    pub date_start: String,
    pub date_end: String,
    pub label: String,
}

/// The four preset options with human-readable labels, resolved against a
/// reference "today". Emitted on both report payloads.
pub fn date_range_options(today: NaiveDate) -> Vec<DateRangeOption> {
    RangePreset::ALL
        .iter()
        .map(|preset| {
            let range = preset.resolve(today);
            DateRangeOption {
                date_start: range.start().map(|d| d.to_string()).unwrap_or_default(),
                date_end: range.end().map(|d| d.to_string()).unwrap_or_default(),
                label: preset.label().to_string(),
            }
        })
        .collect()
}
