//! Metric store schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: Initial schema
    r#"
    -- Per-entity, per-day metric counters.
    --
    -- One row per (scope, entity, day, metric); repeated recordings
    -- accumulate into the same row. rowid order is the entity first-seen
    -- order the ranked report tie-breaks on.
    CREATE TABLE IF NOT EXISTS metrics (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        scope_id    TEXT NOT NULL,
        entity_id   TEXT NOT NULL,
        day         DATE NOT NULL,
        metric      TEXT NOT NULL,
        value       INTEGER NOT NULL DEFAULT 0 CHECK (value >= 0),

        UNIQUE (scope_id, entity_id, day, metric)
    );

    CREATE INDEX IF NOT EXISTS idx_metrics_scope_day ON metrics(scope_id, day);

    -- Displayable entities (published submissions, users).
    CREATE TABLE IF NOT EXISTS entities (
        id          TEXT PRIMARY KEY,
        title       TEXT NOT NULL
    );
    "#,
];

/// Run any pending migrations on this connection
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking metric store migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
