//! Report pipeline
//!
//! One report request runs one synchronous pipeline: resolve the date
//! window, fetch raw metric records from the injected store, aggregate them
//! into time segments, then rank entities (usage report) or extract
//! editorial counters and shape chart series (editorial report). No
//! component retains state between invocations and the pipeline performs no
//! writes, so it is safe to abandon mid-computation.

pub mod chart;
pub mod editorial;
pub mod ranking;
pub mod segments;

pub use chart::{ChartDataset, ChartSeries};
pub use editorial::{ComparisonItem, EditorialStage, StageCount, UserRole, STAGE_PALETTE};
pub use ranking::{usage_table_columns, RankedReport, TableColumn, DEFAULT_ORDER_COLUMN};
pub use segments::{aggregate, Aggregation};

use crate::daterange::{date_range_options, DateRangeOption};
use crate::error::Result;
use crate::store::{EntityLookup, MetricStore};
use crate::types::{DateRange, Granularity, RankedItem, ReportQuery, TimeSegment};
use chrono::NaiveDate;
use serde::Serialize;

/// The usage ("top content") report payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub time_segments: Vec<TimeSegment>,
    pub items: Vec<RankedItem>,
    pub items_max: usize,
    pub table_columns: Vec<TableColumn>,
    pub date_range_options: Vec<DateRangeOption>,
    pub order_by: String,
    pub order_direction: bool,
}

/// The editorial activity report payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorialReport {
    pub editorial_chart_data: ChartSeries,
    pub editorial_items: Vec<ComparisonItem>,
    pub user_items: Vec<ComparisonItem>,
    pub date_range_options: Vec<DateRangeOption>,
}

/// Report pipeline entry point.
///
/// The metric store and entity lookup are injected; the service owns no
/// state of its own and can be shared freely across requests.
pub struct StatsService<'a> {
    store: &'a dyn MetricStore,
    lookup: &'a dyn EntityLookup,
}

impl<'a> StatsService<'a> {
    pub fn new(store: &'a dyn MetricStore, lookup: &'a dyn EntityLookup) -> Self {
        Self { store, lookup }
    }

    /// Build the usage report for a query.
    ///
    /// A scope with no data yields an empty-but-valid report: zero-filled
    /// segments over the window, no items. Store failures propagate
    /// unchanged; there is no partial fallback.
    pub fn usage_report(&self, query: &ReportQuery, today: NaiveDate) -> Result<UsageReport> {
        tracing::debug!(
            scope_id = query.scope_id,
            granularity = query.granularity.as_str(),
            order_by = query.order_by,
            limit = query.limit,
            "Building usage report"
        );

        let records =
            self.store
                .fetch_metrics(&query.scope_id, &query.date_range, query.granularity)?;

        // Editorial counters share the metric stream; the usage report only
        // charts the usage metrics.
        let usage_records: Vec<_> = records
            .into_iter()
            .filter(|r| ranking::USAGE_METRICS.contains(&r.metric.as_str()))
            .collect();

        let aggregation = aggregate(&usage_records, &query.date_range, query.granularity);
        let columns = usage_table_columns();
        let ranked = ranking::rank(ranking::build_items(&usage_records), query, &columns);

        // Resolve display fields after truncation; entities the lookup does
        // not know (unpublished, deleted) are dropped from the rows while
        // items_max still counts them.
        let mut items = Vec::with_capacity(ranked.items.len());
        for mut item in ranked.items {
            match self.lookup.resolve(&item.entity_id)? {
                Some(display) => {
                    item.display_fields.insert("title".to_string(), display.title);
                    items.push(item);
                }
                None => {
                    tracing::debug!(entity_id = item.entity_id, "Skipping unresolvable entity");
                }
            }
        }

        tracing::info!(
            scope_id = query.scope_id,
            items = items.len(),
            items_max = ranked.items_max,
            segments = aggregation.segments.len(),
            "Usage report built"
        );

        Ok(UsageReport {
            time_segments: aggregation.segments,
            items,
            items_max: ranked.items_max,
            table_columns: columns,
            date_range_options: date_range_options(today),
            order_by: query.order_by.clone(),
            order_direction: query.order_descending,
        })
    }

    /// Build the editorial activity report for a scope and date window.
    ///
    /// The reference period is the scope's full history aggregated at year
    /// granularity; the ranged period is the caller's window at day
    /// granularity. Chart data is derived from the reference period.
    pub fn editorial_report(
        &self,
        scope_id: &str,
        range: &DateRange,
        today: NaiveDate,
    ) -> Result<EditorialReport> {
        tracing::debug!(scope_id, "Building editorial report");

        let reference_records =
            self.store
                .fetch_metrics(scope_id, &DateRange::all_time(), Granularity::Year)?;
        let ranged_records = self.store.fetch_metrics(scope_id, range, Granularity::Day)?;

        let reference = aggregate(&reference_records, &DateRange::all_time(), Granularity::Year);
        let ranged = aggregate(&ranged_records, range, Granularity::Day);

        let stage_counts = editorial::stage_chart_counts(&reference);
        let chart = ChartSeries::from_stage_counts("Active submissions", &stage_counts);
        let editorial_items = editorial::extract_editorial_stats(&ranged, &reference);
        let user_items = editorial::extract_user_stats(&ranged, &reference);

        tracing::info!(
            scope_id,
            stages = stage_counts.len(),
            "Editorial report built"
        );

        Ok(EditorialReport {
            editorial_chart_data: chart,
            editorial_items,
            user_items,
            date_range_options: date_range_options(today),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{EntityDisplay, MetricRecord};
    use std::collections::HashMap;
    use std::str::FromStr;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    /// In-memory store used only by these tests.
    #[derive(Default)]
    struct FakeStore {
        records: Vec<MetricRecord>,
        titles: HashMap<String, String>,
        fail: bool,
    }

    impl FakeStore {
        fn with(records: Vec<MetricRecord>, titles: &[(&str, &str)]) -> Self {
            Self {
                records,
                titles: titles
                    .iter()
                    .map(|(id, title)| (id.to_string(), title.to_string()))
                    .collect(),
                fail: false,
            }
        }
    }

    impl MetricStore for FakeStore {
        fn fetch_metrics(
            &self,
            _scope_id: &str,
            range: &DateRange,
            _granularity: Granularity,
        ) -> Result<Vec<MetricRecord>> {
            if self.fail {
                return Err(Error::Adapter("backend offline".to_string()));
            }
            Ok(self
                .records
                .iter()
                .filter(|r| range.contains(r.day))
                .cloned()
                .collect())
        }
    }

    impl EntityLookup for FakeStore {
        fn resolve(&self, entity_id: &str) -> Result<Option<EntityDisplay>> {
            Ok(self.titles.get(entity_id).map(|title| EntityDisplay {
                id: entity_id.to_string(),
                title: title.clone(),
            }))
        }
    }

    fn record(entity: &str, day: &str, metric: &str, value: u64) -> MetricRecord {
        MetricRecord {
            entity_id: entity.to_string(),
            day: d(day),
            metric: metric.to_string(),
            value,
        }
    }

    #[test]
    fn test_usage_report_shape() {
        let store = FakeStore::with(
            vec![
                record("a1", "2026-01-01", "abstract_views", 5),
                record("a1", "2026-01-02", "abstract_views", 3),
                record("a2", "2026-01-01", "pdf", 10),
            ],
            &[("a1", "First Article"), ("a2", "Second Article")],
        );
        let service = StatsService::new(&store, &store);

        let range = DateRange::new(Some(d("2026-01-01")), Some(d("2026-01-02"))).unwrap();
        let query = ReportQuery::new("j1", range);
        let report = service.usage_report(&query, d("2026-02-01")).unwrap();

        assert_eq!(report.time_segments.len(), 2);
        assert_eq!(report.time_segments[0].value, 15);
        assert_eq!(report.time_segments[1].value, 3);

        assert_eq!(report.items_max, 2);
        assert_eq!(report.items[0].entity_id, "a2");
        assert_eq!(report.items[0].display_fields["title"], "Second Article");
        assert_eq!(report.table_columns.len(), 7);
        assert_eq!(report.date_range_options.len(), 4);
    }

    #[test]
    fn test_unknown_scope_is_empty_report() {
        let store = FakeStore::default();
        let service = StatsService::new(&store, &store);

        let range = DateRange::new(Some(d("2026-01-01")), Some(d("2026-01-03"))).unwrap();
        let query = ReportQuery::new("ghost", range);
        let report = service.usage_report(&query, d("2026-02-01")).unwrap();

        assert_eq!(report.time_segments.len(), 3);
        assert!(report.time_segments.iter().all(|s| s.value == 0));
        assert!(report.items.is_empty());
        assert_eq!(report.items_max, 0);
    }

    #[test]
    fn test_unresolvable_entities_skipped_but_counted() {
        let store = FakeStore::with(
            vec![
                record("known", "2026-01-01", "abstract_views", 5),
                record("ghost", "2026-01-01", "abstract_views", 9),
            ],
            &[("known", "A Known Article")],
        );
        let service = StatsService::new(&store, &store);

        let query = ReportQuery::new("j1", DateRange::all_time());
        let report = service.usage_report(&query, d("2026-02-01")).unwrap();

        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].entity_id, "known");
        assert_eq!(report.items_max, 2);
    }

    #[test]
    fn test_store_failure_propagates() {
        let store = FakeStore {
            fail: true,
            ..Default::default()
        };
        let service = StatsService::new(&store, &store);

        let query = ReportQuery::new("j1", DateRange::all_time());
        let err = service.usage_report(&query, d("2026-02-01")).unwrap_err();
        assert!(matches!(err, Error::Adapter(_)));
    }

    #[test]
    fn test_editorial_report_shape() {
        let store = FakeStore::with(
            vec![
                record("s1", "2025-03-01", "stage.submission", 1),
                record("s2", "2025-06-01", "stage.review", 1),
                record("s3", "2026-01-10", "stage.submission", 1),
                record("u1", "2025-01-01", "role.author", 1),
            ],
            &[],
        );
        let service = StatsService::new(&store, &store);

        let range = DateRange::new(Some(d("2026-01-01")), Some(d("2026-01-31"))).unwrap();
        let report = service
            .editorial_report("j1", &range, d("2026-02-01"))
            .unwrap();

        let chart = &report.editorial_chart_data;
        assert_eq!(chart.labels.len(), 4);
        assert_eq!(chart.datasets[0].data.len(), chart.labels.len());
        assert_eq!(
            chart.datasets[0].background_color.len(),
            chart.labels.len()
        );

        // Reference counts both submissions, the ranged window only the
        // January one
        assert_eq!(chart.datasets[0].data[0], 2);
        let submission_row = &report.editorial_items[0];
        assert_eq!(submission_row.value, 1);
        assert_eq!(submission_row.reference_value, 2);

        let authors = report
            .user_items
            .iter()
            .find(|i| i.name == "Authors")
            .unwrap();
        assert_eq!(authors.reference_value, 1);
        assert_eq!(authors.value, 0);

        assert_eq!(report.date_range_options.len(), 4);
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let store = FakeStore::default();
        let service = StatsService::new(&store, &store);

        let query = ReportQuery::new("j1", DateRange::all_time());
        let report = service.usage_report(&query, d("2026-02-01")).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert!(json["timeSegments"].is_array());
        assert!(json["itemsMax"].is_number());
        assert!(json["tableColumns"].is_array());
        assert!(json["dateRangeOptions"].is_array());
    }
}
