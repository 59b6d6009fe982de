//! Ranked report building
//!
//! Turns per-entity metric records into the usage report's ranked item list:
//! computes every declared table column per entity, sorts by the requested
//! column with a stable first-seen tie-break, and truncates to the display
//! limit while keeping the untruncated count for pagination.

use crate::types::{MetricRecord, RankedItem, ReportQuery};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Raw metric names that feed the usage report columns.
pub const USAGE_METRICS: [&str; 4] = ["abstract_views", "pdf", "html", "other"];

/// Column the report defaults to when the requested `orderBy` is unknown.
pub const DEFAULT_ORDER_COLUMN: &str = "total";

/// One column of the usage report's fixed table schema.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    /// Column identifier
    pub name: String,
    /// Display label
    pub label: String,
    /// Accessor key into `metricValues`, absent for display-only columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Marks the default-sort column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    /// Default sort direction for the default-sort column (true = descending)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_order_direction: Option<bool>,
}

impl TableColumn {
    fn display(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: None,
            order_by: None,
            initial_order_direction: None,
        }
    }

    fn metric(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: Some(name.to_string()),
            order_by: None,
            initial_order_direction: None,
        }
    }
}

/// The usage report's fixed table-column schema.
///
/// The "total" column is the default sort, descending.
pub fn usage_table_columns() -> Vec<TableColumn> {
    vec![
        TableColumn::display("title", "Title"),
        TableColumn::metric("abstractViews", "Abstract views"),
        TableColumn::metric("totalFileViews", "File views"),
        TableColumn::metric("pdf", "PDF"),
        TableColumn::metric("html", "HTML"),
        TableColumn::metric("other", "Other"),
        TableColumn {
            name: DEFAULT_ORDER_COLUMN.to_string(),
            label: "Total".to_string(),
            value: Some(DEFAULT_ORDER_COLUMN.to_string()),
            order_by: Some(DEFAULT_ORDER_COLUMN.to_string()),
            initial_order_direction: Some(true),
        },
    ]
}

/// A ranked, truncated item list plus the untruncated entity count.
#[derive(Debug, Clone)]
pub struct RankedReport {
    pub items: Vec<RankedItem>,
    /// Entity count before truncation, for client-side pagination
    pub items_max: usize,
}

/// Group records into one [`RankedItem`] per entity, preserving the store's
/// first-seen entity order.
///
/// Derived columns: `totalFileViews` = pdf + html + other,
/// `total` = abstractViews + totalFileViews. Metrics outside the usage set
/// (editorial counters) are ignored.
pub fn build_items(records: &[MetricRecord]) -> Vec<RankedItem> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut items: Vec<RankedItem> = Vec::new();

    for record in records {
        if !USAGE_METRICS.contains(&record.metric.as_str()) {
            continue;
        }

        let i = match index.get(&record.entity_id) {
            Some(&i) => i,
            None => {
                index.insert(record.entity_id.clone(), items.len());
                items.push(RankedItem {
                    entity_id: record.entity_id.clone(),
                    display_fields: BTreeMap::new(),
                    metric_values: BTreeMap::new(),
                });
                items.len() - 1
            }
        };

        let column = match record.metric.as_str() {
            "abstract_views" => "abstractViews",
            other => other,
        };
        *items[i].metric_values.entry(column.to_string()).or_insert(0) += record.value;
    }

    for item in &mut items {
        let file_views = ["pdf", "html", "other"]
            .iter()
            .map(|m| item.metric_values.get(*m).copied().unwrap_or(0))
            .sum::<u64>();
        let abstract_views = item
            .metric_values
            .get("abstractViews")
            .copied()
            .unwrap_or(0);

        // Every declared metric column is present on every item, zero-filled
        for column in ["abstractViews", "pdf", "html", "other"] {
            item.metric_values.entry(column.to_string()).or_insert(0);
        }
        item.metric_values
            .insert("totalFileViews".to_string(), file_views);
        item.metric_values
            .insert("total".to_string(), abstract_views + file_views);
    }

    items
}

/// Sort and truncate items per the query.
///
/// The sort is stable, so entities with equal values keep their first-seen
/// order and repeated calls with identical input produce identical output.
/// An `orderBy` naming no declared column falls back to the default column
/// instead of failing the report.
pub fn rank(mut items: Vec<RankedItem>, query: &ReportQuery, columns: &[TableColumn]) -> RankedReport {
    let order_column = if columns
        .iter()
        .any(|c| c.value.as_deref() == Some(query.order_by.as_str()))
    {
        query.order_by.as_str()
    } else {
        tracing::warn!(
            order_by = query.order_by,
            fallback = DEFAULT_ORDER_COLUMN,
            "Requested order column not in schema, using default"
        );
        DEFAULT_ORDER_COLUMN
    };

    items.sort_by(|a, b| {
        let av = a.metric_values.get(order_column).copied().unwrap_or(0);
        let bv = b.metric_values.get(order_column).copied().unwrap_or(0);
        if query.order_descending {
            bv.cmp(&av)
        } else {
            av.cmp(&bv)
        }
    });

    let items_max = items.len();
    if query.limit > 0 {
        items.truncate(query.limit);
    }

    RankedReport { items, items_max }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DateRange;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn record(entity: &str, metric: &str, value: u64) -> MetricRecord {
        MetricRecord {
            entity_id: entity.to_string(),
            day: NaiveDate::from_str("2026-01-01").unwrap(),
            metric: metric.to_string(),
            value,
        }
    }

    fn query() -> ReportQuery {
        ReportQuery::new("j1", DateRange::all_time())
    }

    #[test]
    fn test_column_schema_shape() {
        let columns = usage_table_columns();
        assert_eq!(columns.len(), 7);
        assert!(columns[0].value.is_none());

        let total = columns.last().unwrap();
        assert_eq!(total.order_by.as_deref(), Some("total"));
        assert_eq!(total.initial_order_direction, Some(true));
    }

    #[test]
    fn test_build_items_computes_derived_columns() {
        let records = vec![
            record("a1", "abstract_views", 10),
            record("a1", "pdf", 4),
            record("a1", "html", 2),
        ];
        let items = build_items(&records);

        assert_eq!(items.len(), 1);
        let values = &items[0].metric_values;
        assert_eq!(values["abstractViews"], 10);
        assert_eq!(values["totalFileViews"], 6);
        assert_eq!(values["other"], 0);
        assert_eq!(values["total"], 16);
    }

    #[test]
    fn test_build_items_ignores_editorial_metrics() {
        let records = vec![
            record("s1", "stage.review", 1),
            record("a1", "abstract_views", 3),
        ];
        let items = build_items(&records);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].entity_id, "a1");
    }

    #[test]
    fn test_rank_descending_by_total() {
        let records = vec![
            record("a1", "abstract_views", 10),
            record("a2", "abstract_views", 30),
            record("a3", "abstract_views", 20),
        ];
        let report = rank(build_items(&records), &query(), &usage_table_columns());

        let totals: Vec<u64> = report
            .items
            .iter()
            .map(|i| i.metric_values["total"])
            .collect();
        assert_eq!(totals, vec![30, 20, 10]);
    }

    #[test]
    fn test_rank_ascending() {
        let records = vec![
            record("a1", "abstract_views", 10),
            record("a2", "abstract_views", 30),
        ];
        let mut q = query();
        q.order_descending = false;
        let report = rank(build_items(&records), &q, &usage_table_columns());

        assert_eq!(report.items[0].entity_id, "a1");
    }

    #[test]
    fn test_limit_preserves_items_max() {
        let records = vec![
            record("a1", "abstract_views", 10),
            record("a2", "abstract_views", 30),
            record("a3", "abstract_views", 20),
        ];
        let mut q = query();
        q.limit = 2;
        let report = rank(build_items(&records), &q, &usage_table_columns());

        assert_eq!(report.items.len(), 2);
        assert_eq!(report.items_max, 3);
    }

    #[test]
    fn test_ties_break_by_first_seen_order() {
        let records = vec![
            record("late", "abstract_views", 5),
            record("early", "abstract_views", 5),
        ];
        let report = rank(build_items(&records), &query(), &usage_table_columns());

        // "late" was seen first in the record stream, so it stays first
        let order: Vec<&str> = report.items.iter().map(|i| i.entity_id.as_str()).collect();
        assert_eq!(order, vec!["late", "early"]);

        // Re-ranking the same input yields the same order
        let again = rank(build_items(&records), &query(), &usage_table_columns());
        let order_again: Vec<&str> = again.items.iter().map(|i| i.entity_id.as_str()).collect();
        assert_eq!(order, order_again);
    }

    #[test]
    fn test_permuted_input_changes_only_tie_order() {
        let records = vec![
            record("tied-a", "abstract_views", 5),
            record("winner", "abstract_views", 9),
            record("tied-b", "abstract_views", 5),
        ];
        let permuted = vec![
            record("tied-b", "abstract_views", 5),
            record("winner", "abstract_views", 9),
            record("tied-a", "abstract_views", 5),
        ];

        let report = rank(build_items(&records), &query(), &usage_table_columns());
        let swapped = rank(build_items(&permuted), &query(), &usage_table_columns());

        let order: Vec<&str> = report.items.iter().map(|i| i.entity_id.as_str()).collect();
        let swapped_order: Vec<&str> =
            swapped.items.iter().map(|i| i.entity_id.as_str()).collect();

        // The non-tied winner sorts first either way; the tied pair follows
        // its first-seen order in each stream
        assert_eq!(order, vec!["winner", "tied-a", "tied-b"]);
        assert_eq!(swapped_order, vec!["winner", "tied-b", "tied-a"]);
    }

    #[test]
    fn test_unknown_order_column_falls_back_to_total() {
        let records = vec![
            record("a1", "abstract_views", 10),
            record("a2", "abstract_views", 30),
        ];
        let mut q = query();
        q.order_by = "no_such_column".to_string();
        let report = rank(build_items(&records), &q, &usage_table_columns());

        assert_eq!(report.items[0].entity_id, "a2");
    }

    #[test]
    fn test_zero_limit_means_no_truncation() {
        let records = vec![
            record("a1", "abstract_views", 1),
            record("a2", "abstract_views", 2),
        ];
        let mut q = query();
        q.limit = 0;
        let report = rank(build_items(&records), &q, &usage_table_columns());
        assert_eq!(report.items.len(), 2);
    }
}
