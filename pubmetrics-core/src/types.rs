//! Core domain types for pubmetrics
//!
//! These types represent the canonical data model shared by both reports.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Scope** | The publication context (a journal or press) whose data is reported on |
//! | **Entity** | A reportable item inside a scope (a published submission, a user) |
//! | **Metric** | A named counter attached to an entity on a calendar day |
//! | **Segment** | A time bucket (day, month, or year) used to group metrics for charting |
//! | **Stage** | An editorial workflow phase a submission currently occupies |
//!
//! All metric values are non-negative counts keyed by
//! `(entity_id, day, metric)` within a scope. The store is the only owner of
//! historical data; everything else is constructed per request and discarded
//! after the report payload is produced.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================
// Granularity
// ============================================

/// Time-bucket width used to group metrics for charting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "day" => Ok(Granularity::Day),
            "month" => Ok(Granularity::Month),
            "year" => Ok(Granularity::Year),
            _ => Err(format!("unknown granularity: {}", s)),
        }
    }
}

// ============================================
// DateRange
// ============================================

/// An inclusive calendar date window.
///
/// `None` on both ends means "all time". When both bounds are set the
/// constructor enforces `start <= end`; a range that violates this is
/// rejected before any fetch happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRange {
    /// Create a validated range. Fails with [`Error::InvalidRange`] when both
    /// bounds are present and start is after end.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(Error::InvalidRange { start: s, end: e });
            }
        }
        Ok(Self { start, end })
    }

    /// The unbounded "all time" range.
    pub fn all_time() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Construct from bounds already known to be ordered (preset arithmetic).
    pub(crate) fn from_parts(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        debug_assert!(matches!((start, end), (Some(s), Some(e)) if s <= e) || start.is_none() || end.is_none());
        Self { start, end }
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    /// True when both bounds are absent.
    pub fn is_all_time(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether a calendar day falls inside this range. Missing bounds are
    /// open on that side.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start.map_or(true, |s| day >= s) && self.end.map_or(true, |e| day <= e)
    }
}

// ============================================
// Metric records
// ============================================

/// A raw per-entity, per-day metric count as returned by the store.
///
/// Uniquely identified by `(entity_id, day, metric)` within a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRecord {
    /// Entity the count belongs to (submission id, user id)
    pub entity_id: String,
    /// Calendar day the count was recorded against
    pub day: NaiveDate,
    /// Metric name (e.g. "abstract_views", "stage.review")
    pub metric: String,
    /// Non-negative count
    pub value: u64,
}

// ============================================
// Report query
// ============================================

/// Immutable parameters for one usage-report invocation.
#[derive(Debug, Clone)]
pub struct ReportQuery {
    /// Publication context being reported on
    pub scope_id: String,
    /// Requested date window
    pub date_range: DateRange,
    /// Time-bucket width for the chart segments
    pub granularity: Granularity,
    /// Table column to order entities by
    pub order_by: String,
    /// Descending when true
    pub order_descending: bool,
    /// Number of entities to return for display (0 = no truncation)
    pub limit: usize,
}

impl ReportQuery {
    /// Query with the report's default ordering (total, descending) and the
    /// platform default display limit.
    pub fn new(scope_id: impl Into<String>, date_range: DateRange) -> Self {
        Self {
            scope_id: scope_id.into(),
            date_range,
            granularity: Granularity::Day,
            order_by: "total".to_string(),
            order_descending: true,
            limit: 20,
        }
    }
}

// ============================================
// Ranked items and entity display
// ============================================

/// One ranked entity row in the usage report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedItem {
    /// Entity identifier
    pub entity_id: String,
    /// Displayable fields resolved from the entity lookup (e.g. "title")
    pub display_fields: BTreeMap<String, String>,
    /// Computed value per table column name
    pub metric_values: BTreeMap<String, u64>,
}

/// Displayable entity resolved by an [`crate::store::EntityLookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDisplay {
    pub id: String,
    pub title: String,
}

// ============================================
// Time segments
// ============================================

/// One ordered chart bucket with its aggregated value.
///
/// `date` is the bucket start day; it is absent only for the degenerate
/// all-time segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSegment {
    pub date: Option<NaiveDate>,
    pub label: String,
    pub value: u64,
}
