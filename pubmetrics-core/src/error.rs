//! Error types for pubmetrics-core

use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for the pubmetrics-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Metric store error (bundled SQLite adapter)
    #[error("metric store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Metric store adapter unavailable or failing
    #[error("metric store unavailable: {0}")]
    Adapter(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Date range with start after end, rejected before any fetch
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Result type alias for pubmetrics-core
pub type Result<T> = std::result::Result<T, Error>;
