//! Metric storage layer
//!
//! The report pipeline only ever talks to the [`MetricStore`] and
//! [`EntityLookup`] traits; they are injected into the pipeline entry point
//! so alternative backends can be swapped in. The bundled implementation
//! ([`MetricDb`]) keeps per-entity, per-day counters in SQLite with:
//! - Schema migrations via `PRAGMA user_version`
//! - Insertion-ordered reads so ranking tie-breaks stay deterministic

pub mod repo;
pub mod schema;

pub use repo::MetricDb;

use crate::error::Result;
use crate::types::{DateRange, EntityDisplay, Granularity, MetricRecord};

/// Read-only source of raw metric counts for a scope and date window.
///
/// Implementations must return records in a stable first-seen order across
/// repeated calls with identical input; the ranked report's tie-breaking
/// depends on it. A failing backend should surface its own error; the
/// pipeline propagates it unchanged and performs no partial fallback.
pub trait MetricStore {
    /// Fetch all metric records for a scope inside the given range.
    ///
    /// `granularity` is part of the contract so pre-aggregating backends can
    /// avoid fetching day-level rows; the bundled store always returns
    /// day-keyed records and lets the aggregator bucket them.
    fn fetch_metrics(
        &self,
        scope_id: &str,
        range: &DateRange,
        granularity: Granularity,
    ) -> Result<Vec<MetricRecord>>;
}

/// Resolves entity ids to displayable fields for report rows.
pub trait EntityLookup {
    /// Resolve one entity, or `None` when it is absent (unpublished,
    /// deleted). Absent entities are skipped from report rows, never an
    /// error.
    fn resolve(&self, entity_id: &str) -> Result<Option<EntityDisplay>>;
}
