//! Chart series shaping
//!
//! Pure mapping from stage counts to a chart-ready series. Labels, data and
//! colors are produced in one pass over the stages so they can never be
//! reordered independently of each other.

use crate::report::editorial::StageCount;
use serde::Serialize;

/// One dataset of a chart series.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<u64>,
    pub background_color: Vec<String>,
}

/// Chart-ready series: `labels[i]`, `datasets[j].data[i]` and
/// `datasets[j].background_color[i]` always describe the same stage.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

impl ChartSeries {
    /// Build a single-dataset series from stage counts, in stage order.
    pub fn from_stage_counts(dataset_label: &str, stages: &[StageCount]) -> Self {
        let mut labels = Vec::with_capacity(stages.len());
        let mut data = Vec::with_capacity(stages.len());
        let mut colors = Vec::with_capacity(stages.len());

        for stage in stages {
            labels.push(stage.name.clone());
            data.push(stage.value);
            colors.push(stage.color.clone());
        }

        Self {
            labels,
            datasets: vec![ChartDataset {
                label: dataset_label.to_string(),
                data,
                background_color: colors,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(name: &str, value: u64, color: &str) -> StageCount {
        StageCount {
            name: name.to_string(),
            value,
            color: color.to_string(),
        }
    }

    #[test]
    fn test_lengths_always_match() {
        let stages = vec![
            stage("Submission", 2, "#d00a0a"),
            stage("Review", 0, "#e08914"),
            stage("Production", 5, "#007ab2"),
        ];
        let series = ChartSeries::from_stage_counts("Active submissions", &stages);

        assert_eq!(series.labels.len(), 3);
        let dataset = &series.datasets[0];
        assert_eq!(dataset.data.len(), series.labels.len());
        assert_eq!(dataset.background_color.len(), series.labels.len());
    }

    #[test]
    fn test_stage_order_is_preserved_across_sequences() {
        let stages = vec![
            stage("B", 1, "#000001"),
            stage("A", 9, "#000002"),
        ];
        let series = ChartSeries::from_stage_counts("Active submissions", &stages);

        // No sorting: index i in every sequence refers to the same stage
        assert_eq!(series.labels, vec!["B", "A"]);
        assert_eq!(series.datasets[0].data, vec![1, 9]);
        assert_eq!(
            series.datasets[0].background_color,
            vec!["#000001", "#000002"]
        );
    }

    #[test]
    fn test_empty_stages() {
        let series = ChartSeries::from_stage_counts("Active submissions", &[]);
        assert!(series.labels.is_empty());
        assert!(series.datasets[0].data.is_empty());
    }

    #[test]
    fn test_serializes_camel_case() {
        let series = ChartSeries::from_stage_counts("Active submissions", &[stage("S", 1, "#fff")]);
        let json = serde_json::to_value(&series).unwrap();
        assert!(json["datasets"][0]["backgroundColor"].is_array());
    }
}
