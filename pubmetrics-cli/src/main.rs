//! pubmetrics - editorial platform statistics reports
//!
//! Records usage/editorial counters and renders the two reports (top
//! content, editorial activity) as terminal text or JSON.

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use pubmetrics_core::daterange::RangePreset;
use pubmetrics_core::report::{EditorialReport, StatsService, UsageReport};
use pubmetrics_core::{Config, DateRange, Granularity, MetricDb, ReportQuery};

#[derive(Parser, Debug)]
#[command(name = "pubmetrics")]
#[command(about = "Statistics reports for an editorial platform")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a metric count against an entity
    Record {
        /// Publication context (journal/press id)
        #[arg(long)]
        scope: String,

        /// Entity the count belongs to (submission or user id)
        #[arg(long)]
        entity: String,

        /// Metric name (e.g. abstract_views, pdf, stage.review, stage_days.review, role.author)
        #[arg(long)]
        metric: String,

        /// Calendar day (YYYY-MM-DD, default: yesterday)
        #[arg(long)]
        day: Option<String>,

        /// Count to add
        #[arg(long, default_value_t = 1)]
        value: u64,
    },

    /// Register or rename a displayable entity
    Entity {
        /// Entity id
        id: String,
        /// Display title
        title: String,
    },

    /// Top content usage report
    Usage {
        /// Publication context (journal/press id)
        #[arg(long)]
        scope: String,

        /// Range start (YYYY-MM-DD, empty for all time)
        #[arg(long)]
        from: Option<String>,

        /// Range end (YYYY-MM-DD, empty for all time)
        #[arg(long)]
        to: Option<String>,

        /// Chart bucket width (day, month, year)
        #[arg(long)]
        granularity: Option<Granularity>,

        /// Column to order by
        #[arg(long)]
        order_by: Option<String>,

        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,

        /// Number of items to show
        #[arg(long)]
        limit: Option<usize>,

        /// Export format (json)
        #[arg(long)]
        export: Option<String>,
    },

    /// Editorial activity report
    Editorial {
        /// Publication context (journal/press id)
        #[arg(long)]
        scope: String,

        /// Range start (YYYY-MM-DD, empty for all time)
        #[arg(long)]
        from: Option<String>,

        /// Range end (YYYY-MM-DD, empty for all time)
        #[arg(long)]
        to: Option<String>,

        /// Export format (json)
        #[arg(long)]
        export: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = pubmetrics_core::logging::init(&config.logging).ok();

    let db_path = Config::database_path();
    let db = MetricDb::open(&db_path).context("failed to open metric store")?;
    db.migrate().context("failed to run migrations")?;

    let today = Local::now().date_naive();

    match args.command {
        Command::Record {
            scope,
            entity,
            metric,
            day,
            value,
        } => {
            let day = match day {
                Some(s) => parse_day(&s)?,
                None => today - Duration::days(1),
            };
            db.record_metric(&scope, &entity, day, &metric, value)
                .context("failed to record metric")?;
            println!("Recorded {} {} for {} on {}", value, metric, entity, day);
        }

        Command::Entity { id, title } => {
            db.upsert_entity(&id, &title)
                .context("failed to upsert entity")?;
            println!("Entity {} -> \"{}\"", id, title);
        }

        Command::Usage {
            scope,
            from,
            to,
            granularity,
            order_by,
            asc,
            limit,
            export,
        } => {
            let range = resolve_range(from.as_deref(), to.as_deref(), today)?;
            let mut query = ReportQuery::new(scope, range);
            query.granularity = granularity.unwrap_or(config.reports.usage_granularity);
            if let Some(order_by) = order_by {
                query.order_by = order_by;
            }
            query.order_descending = !asc;
            query.limit = limit.unwrap_or(config.reports.item_limit);

            let service = StatsService::new(&db, &db);
            let report = service
                .usage_report(&query, today)
                .context("failed to build usage report")?;

            match export.as_deref() {
                Some("json") => print_json(&report)?,
                Some(other) => anyhow::bail!("Unknown export format: {}. Use 'json'", other),
                None => print_usage_terminal(&report),
            }
        }

        Command::Editorial {
            scope,
            from,
            to,
            export,
        } => {
            let range = resolve_range(from.as_deref(), to.as_deref(), today)?;
            let service = StatsService::new(&db, &db);
            let report = service
                .editorial_report(&scope, &range, today)
                .context("failed to build editorial report")?;

            match export.as_deref() {
                Some("json") => print_json(&report)?,
                Some(other) => anyhow::bail!("Unknown export format: {}. Use 'json'", other),
                None => print_editorial_terminal(&report),
            }
        }
    }

    Ok(())
}

fn parse_day(s: &str) -> Result<NaiveDate> {
    s.parse::<NaiveDate>()
        .with_context(|| format!("Invalid date: {}. Use YYYY-MM-DD", s))
}

/// Resolve CLI bounds into a validated window. Both absent falls back to the
/// last-30-days preset; empty strings mean all time.
fn resolve_range(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> Result<DateRange> {
    if from.is_none() && to.is_none() {
        return Ok(RangePreset::Last30Days.resolve(today));
    }

    let parse = |bound: Option<&str>| -> Result<Option<NaiveDate>> {
        match bound {
            None => Ok(None),
            Some("") => Ok(None),
            Some(s) => Ok(Some(parse_day(s)?)),
        }
    };

    DateRange::new(parse(from)?, parse(to)?).context("invalid date range")
}

fn print_json<T: serde::Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn print_usage_terminal(report: &UsageReport) {
    println!();
    println!("TOP CONTENT");
    println!("{}", "-".repeat(72));

    if report.items.is_empty() {
        println!("  No usage recorded for this period.");
        println!();
        return;
    }

    println!(
        "  {:<4} {:<34} {:>8} {:>8} {:>8}",
        "#", "Title", "Abstract", "Files", "Total"
    );
    for (i, item) in report.items.iter().enumerate() {
        let title = item
            .display_fields
            .get("title")
            .map(String::as_str)
            .unwrap_or(item.entity_id.as_str());
        let get = |col: &str| item.metric_values.get(col).copied().unwrap_or(0);
        println!(
            "  {:<4} {:<34} {:>8} {:>8} {:>8}",
            i + 1,
            truncate(title, 34),
            get("abstractViews"),
            get("totalFileViews"),
            get("total"),
        );
    }

    println!();
    println!(
        "  Showing {} of {} items",
        report.items.len(),
        report.items_max
    );

    println!();
    println!("ACTIVITY");
    for segment in &report.time_segments {
        println!("  {:<16} {}", segment.label, segment.value);
    }
    println!();
}

fn print_editorial_terminal(report: &EditorialReport) {
    println!();
    println!("EDITORIAL ACTIVITY");
    println!("{}", "-".repeat(72));

    println!("  {:<20} {:>10} {:>12}", "Stage", "Period", "Reference");
    for item in &report.editorial_items {
        println!(
            "  {:<20} {:>10} {:>12}",
            item.name, item.value, item.reference_value
        );
    }

    println!();
    println!("USERS");
    println!("  {:<20} {:>10} {:>12}", "Role", "Period", "Reference");
    for item in &report.user_items {
        println!(
            "  {:<20} {:>10} {:>12}",
            item.name, item.value, item.reference_value
        );
    }

    println!();
    println!("SUBMISSIONS BY STAGE");
    let dataset = &report.editorial_chart_data.datasets[0];
    for (label, value) in report.editorial_chart_data.labels.iter().zip(&dataset.data) {
        let bar = "#".repeat((*value).min(40) as usize);
        println!("  {:<14} {:>5}  {}", label, value, bar);
    }
    println!();
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
