//! Time-segment aggregation
//!
//! Buckets raw metric records into ordered day/month/year segments spanning
//! the entire requested range, zero-filling gaps so chart consumers never
//! see missing x-axis points, and computes per-metric grand totals.

use crate::types::{DateRange, Granularity, MetricRecord, TimeSegment};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};

/// Aggregated view of a record set over one date window.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Bucket width the segments were computed at
    pub granularity: Granularity,
    /// Contiguous chart buckets in chronological ascending order
    pub segments: Vec<TimeSegment>,
    /// Grand total per metric name across the whole range
    pub totals: BTreeMap<String, u64>,
}

impl Aggregation {
    /// Grand total for one metric name, zero when absent.
    pub fn total(&self, metric: &str) -> u64 {
        self.totals.get(metric).copied().unwrap_or(0)
    }
}

/// Bucket records into contiguous time segments over `range`.
///
/// Segment values sum every record whose day falls in the bucket, regardless
/// of metric name; per-metric splits live in [`Aggregation::totals`].
/// Records outside the range are ignored. An all-time range degenerates to a
/// single "All dates" segment covering the whole data span.
pub fn aggregate(
    records: &[MetricRecord],
    range: &DateRange,
    granularity: Granularity,
) -> Aggregation {
    let mut totals: BTreeMap<String, u64> = BTreeMap::new();
    for record in records {
        if !range.contains(record.day) {
            continue;
        }
        *totals.entry(record.metric.clone()).or_insert(0) += record.value;
    }

    if range.is_all_time() {
        let value = totals.values().sum();
        return Aggregation {
            granularity,
            segments: vec![TimeSegment {
                date: None,
                label: "All dates".to_string(),
                value,
            }],
            totals,
        };
    }

    let mut segments = match effective_bounds(records, range) {
        Some((start, end)) => enumerate_buckets(start, end, granularity),
        None => Vec::new(),
    };

    // Bucket-start date -> segment index, for the summing pass
    let index: HashMap<NaiveDate, usize> = segments
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.date.map(|d| (d, i)))
        .collect();

    for record in records {
        if !range.contains(record.day) {
            continue;
        }
        if let Some(&i) = index.get(&bucket_start(record.day, granularity)) {
            segments[i].value += record.value;
        }
    }

    Aggregation {
        granularity,
        segments,
        totals,
    }
}

/// Resolve the concrete first and last day to enumerate buckets over.
///
/// Open bounds fall back to the data span; a range with an open side and no
/// records has no enumerable span.
fn effective_bounds(records: &[MetricRecord], range: &DateRange) -> Option<(NaiveDate, NaiveDate)> {
    let start = range.start().or_else(|| {
        records
            .iter()
            .filter(|r| range.contains(r.day))
            .map(|r| r.day)
            .min()
    })?;
    let end = range.end().or_else(|| {
        records
            .iter()
            .filter(|r| range.contains(r.day))
            .map(|r| r.day)
            .max()
    })?;
    Some((start, end))
}

/// First day of the bucket containing `day`.
fn bucket_start(day: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => day,
        Granularity::Month => NaiveDate::from_ymd_opt(day.year(), day.month(), 1).unwrap(),
        Granularity::Year => NaiveDate::from_ymd_opt(day.year(), 1, 1).unwrap(),
    }
}

/// First day of the bucket following `bucket`.
fn next_bucket(bucket: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => bucket + Duration::days(1),
        Granularity::Month => {
            let (year, month) = if bucket.month() == 12 {
                (bucket.year() + 1, 1)
            } else {
                (bucket.year(), bucket.month() + 1)
            };
            NaiveDate::from_ymd_opt(year, month, 1).unwrap()
        }
        Granularity::Year => NaiveDate::from_ymd_opt(bucket.year() + 1, 1, 1).unwrap(),
    }
}

/// Chart label for a bucket.
fn bucket_label(bucket: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => bucket.format("%Y-%m-%d").to_string(),
        Granularity::Month => bucket.format("%B %Y").to_string(),
        Granularity::Year => bucket.format("%Y").to_string(),
    }
}

/// Zero-valued segments for every bucket from `start` through `end`.
fn enumerate_buckets(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> Vec<TimeSegment> {
    let mut segments = Vec::new();
    let mut bucket = bucket_start(start, granularity);
    while bucket <= end {
        segments.push(TimeSegment {
            date: Some(bucket),
            label: bucket_label(bucket, granularity),
            value: 0,
        });
        bucket = next_bucket(bucket, granularity);
    }
    segments
}
