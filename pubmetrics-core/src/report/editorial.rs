//! Editorial statistics extraction
//!
//! Derives the editorial report's counters from two aggregations of the same
//! scope: a reference period (all-time at year granularity) and the
//! user-selected ranged period. Stage and role counters live in the metric
//! stream under the `stage.`, `role.` and `decision.` prefixes.

use crate::report::segments::Aggregation;
use serde::Serialize;

/// Fixed chart palette, indexed by stage position so coloring is stable
/// across requests.
pub const STAGE_PALETTE: [&str; 5] = ["#d00a0a", "#e08914", "#007ab2", "#00b28d", "#7454a6"];

/// Editorial workflow stages, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorialStage {
    Submission,
    Review,
    Copyediting,
    Production,
}

impl EditorialStage {
    /// All declared stages, in pipeline order. Every stage is always
    /// reported, including zero-valued ones; omitting a stage would
    /// misrepresent the pipeline shape.
    pub const ALL: [EditorialStage; 4] = [
        EditorialStage::Submission,
        EditorialStage::Review,
        EditorialStage::Copyediting,
        EditorialStage::Production,
    ];

    /// Metric name this stage's counters are recorded under.
    pub fn metric(&self) -> &'static str {
        match self {
            EditorialStage::Submission => "stage.submission",
            EditorialStage::Review => "stage.review",
            EditorialStage::Copyediting => "stage.copyediting",
            EditorialStage::Production => "stage.production",
        }
    }

    /// Metric name for accumulated days submissions have spent in this stage.
    pub fn days_metric(&self) -> &'static str {
        match self {
            EditorialStage::Submission => "stage_days.submission",
            EditorialStage::Review => "stage_days.review",
            EditorialStage::Copyediting => "stage_days.copyediting",
            EditorialStage::Production => "stage_days.production",
        }
    }

    /// Display name for this stage's time-in-stage row.
    pub fn days_label(&self) -> &'static str {
        match self {
            EditorialStage::Submission => "Days in Submission",
            EditorialStage::Review => "Days in Review",
            EditorialStage::Copyediting => "Days in Copyediting",
            EditorialStage::Production => "Days in Production",
        }
    }

    /// Display name.
    pub fn label(&self) -> &'static str {
        match self {
            EditorialStage::Submission => "Submission",
            EditorialStage::Review => "Review",
            EditorialStage::Copyediting => "Copyediting",
            EditorialStage::Production => "Production",
        }
    }

    /// Palette color for this stage's position.
    pub fn color(&self) -> &'static str {
        let position = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        STAGE_PALETTE[position % STAGE_PALETTE.len()]
    }
}

/// User roles reported in the editorial report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Manager,
    Editor,
    Reviewer,
    Author,
    Reader,
}

impl UserRole {
    pub const ALL: [UserRole; 5] = [
        UserRole::Manager,
        UserRole::Editor,
        UserRole::Reviewer,
        UserRole::Author,
        UserRole::Reader,
    ];

    pub fn metric(&self) -> &'static str {
        match self {
            UserRole::Manager => "role.manager",
            UserRole::Editor => "role.editor",
            UserRole::Reviewer => "role.reviewer",
            UserRole::Author => "role.author",
            UserRole::Reader => "role.reader",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Manager => "Managers",
            UserRole::Editor => "Editors",
            UserRole::Reviewer => "Reviewers",
            UserRole::Author => "Authors",
            UserRole::Reader => "Readers",
        }
    }
}

/// One stage with its submission count and chart color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageCount {
    pub name: String,
    pub value: u64,
    pub color: String,
}

/// One "this period vs. baseline" comparison row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonItem {
    pub name: String,
    /// Count in the user-selected ranged period
    pub value: u64,
    /// Count in the reference period
    pub reference_value: u64,
}

/// Per-stage submission counts for the chart, colored by stage position.
///
/// Stages with zero submissions are still emitted.
pub fn stage_chart_counts(reference: &Aggregation) -> Vec<StageCount> {
    EditorialStage::ALL
        .iter()
        .map(|stage| StageCount {
            name: stage.label().to_string(),
            value: reference.total(stage.metric()),
            color: stage.color().to_string(),
        })
        .collect()
}

/// Editorial comparison rows: active submissions per stage, time-in-stage
/// day counts per stage, plus accepted, declined and acceptance-rate rows
/// derived from `decision.*` counters.
pub fn extract_editorial_stats(ranged: &Aggregation, reference: &Aggregation) -> Vec<ComparisonItem> {
    let mut items: Vec<ComparisonItem> = EditorialStage::ALL
        .iter()
        .map(|stage| ComparisonItem {
            name: stage.label().to_string(),
            value: ranged.total(stage.metric()),
            reference_value: reference.total(stage.metric()),
        })
        .collect();

    // Time-in-stage counters accumulate under `stage_days.*`, zero-filled
    // like the stage rows
    for stage in &EditorialStage::ALL {
        items.push(ComparisonItem {
            name: stage.days_label().to_string(),
            value: ranged.total(stage.days_metric()),
            reference_value: reference.total(stage.days_metric()),
        });
    }

    items.push(ComparisonItem {
        name: "Accepted".to_string(),
        value: ranged.total("decision.accept"),
        reference_value: reference.total("decision.accept"),
    });
    items.push(ComparisonItem {
        name: "Declined".to_string(),
        value: ranged.total("decision.decline"),
        reference_value: reference.total("decision.decline"),
    });
    items.push(ComparisonItem {
        name: "Acceptance rate".to_string(),
        value: acceptance_rate_pct(ranged),
        reference_value: acceptance_rate_pct(reference),
    });

    items
}

/// Per-role user counts, zero-filled like the stage rows.
pub fn extract_user_stats(ranged: &Aggregation, reference: &Aggregation) -> Vec<ComparisonItem> {
    UserRole::ALL
        .iter()
        .map(|role| ComparisonItem {
            name: role.label().to_string(),
            value: ranged.total(role.metric()),
            reference_value: reference.total(role.metric()),
        })
        .collect()
}

/// Accepted decisions as an integer percentage of all decisions, 0 when the
/// period has no decisions.
fn acceptance_rate_pct(agg: &Aggregation) -> u64 {
    let accepted = agg.total("decision.accept");
    let declined = agg.total("decision.decline");
    let decisions = accepted + declined;
    if decisions == 0 {
        return 0;
    }
    (accepted * 100 + decisions / 2) / decisions
}
