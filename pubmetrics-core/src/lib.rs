//! # pubmetrics-core
//!
//! Statistics-reporting engine for an editorial/publishing platform.
//!
//! This library provides:
//! - Canonical date-window resolution shared by every report
//! - Time-segment aggregation of raw metric records with zero-filled gaps
//! - Ranked, paginated item lists with deterministic tie-breaking
//! - Editorial-pipeline counters and chart-ready series
//! - A SQLite metric store behind an injectable adapter boundary
//!
//! ## Pipeline
//!
//! One report request runs one synchronous pipeline:
//!
//! ```text
//! DateRange -> fetch (MetricStore) -> aggregate -> rank / extract -> chart -> payload
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use pubmetrics_core::{Config, MetricDb, ReportQuery, StatsService};
//! use pubmetrics_core::daterange::RangePreset;
//!
//! let db = MetricDb::open(&Config::database_path()).expect("failed to open metric store");
//! db.migrate().expect("failed to run migrations");
//!
//! let today = chrono::Local::now().date_naive();
//! let service = StatsService::new(&db, &db);
//! let query = ReportQuery::new("journal-1", RangePreset::Last30Days.resolve(today));
//! let report = service.usage_report(&query, today).expect("failed to build report");
//! println!("{} items", report.items_max);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use report::StatsService;
pub use store::{EntityLookup, MetricDb, MetricStore};
pub use types::*;

// Public modules
pub mod config;
pub mod daterange;
pub mod error;
pub mod logging;
pub mod report;
pub mod store;
pub mod types;
