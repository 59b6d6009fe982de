//! SQLite metric store
//!
//! Provides the recording surface plus the [`MetricStore`] and
//! [`EntityLookup`] implementations the report pipeline consumes.

use crate::error::Result;
use crate::store::{EntityLookup, MetricStore};
use crate::types::{DateRange, EntityDisplay, Granularity, MetricRecord};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Mutex;

/// Metric database handle (single connection)
pub struct MetricDb {
    conn: Mutex<Connection>,
}

impl MetricDb {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    /// Record a metric count against an entity on a calendar day.
    ///
    /// Repeated recordings for the same `(scope, entity, day, metric)`
    /// accumulate.
    pub fn record_metric(
        &self,
        scope_id: &str,
        entity_id: &str,
        day: NaiveDate,
        metric: &str,
        value: u64,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO metrics (scope_id, entity_id, day, metric, value)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(scope_id, entity_id, day, metric) DO UPDATE SET
                value = value + excluded.value
            "#,
            params![scope_id, entity_id, day, metric, value as i64],
        )?;
        Ok(())
    }

    /// Insert or update a displayable entity
    pub fn upsert_entity(&self, id: &str, title: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO entities (id, title)
            VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET title = excluded.title
            "#,
            params![id, title],
        )?;
        Ok(())
    }
}

impl MetricStore for MetricDb {
    fn fetch_metrics(
        &self,
        scope_id: &str,
        range: &DateRange,
        _granularity: Granularity,
    ) -> Result<Vec<MetricRecord>> {
        let conn = self.conn.lock().unwrap();

        // rowid order preserves first-seen entity order for tie-breaking
        let mut stmt = conn.prepare(
            r#"
            SELECT entity_id, day, metric, value
            FROM metrics
            WHERE scope_id = ?1
              AND (?2 IS NULL OR day >= ?2)
              AND (?3 IS NULL OR day <= ?3)
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map(params![scope_id, range.start(), range.end()], |row| {
            Ok(MetricRecord {
                entity_id: row.get(0)?,
                day: row.get(1)?,
                metric: row.get(2)?,
                value: row.get::<_, i64>(3)? as u64,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }

        tracing::debug!(
            scope_id,
            records = records.len(),
            "Fetched metric records"
        );

        Ok(records)
    }
}

impl EntityLookup for MetricDb {
    fn resolve(&self, entity_id: &str) -> Result<Option<EntityDisplay>> {
        let conn = self.conn.lock().unwrap();
        let title: Option<String> = conn
            .query_row(
                "SELECT title FROM entities WHERE id = ?1",
                [entity_id],
                |r| r.get(0),
            )
            .optional()?;

        Ok(title.map(|title| EntityDisplay {
            id: entity_id.to_string(),
            title,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn test_db() -> MetricDb {
        let db = MetricDb::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn test_record_and_fetch() {
        let db = test_db();
        db.record_metric("j1", "a1", d("2026-01-05"), "abstract_views", 5)
            .unwrap();
        db.record_metric("j1", "a2", d("2026-01-06"), "abstract_views", 3)
            .unwrap();

        let records = db
            .fetch_metrics("j1", &DateRange::all_time(), Granularity::Day)
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].entity_id, "a1");
        assert_eq!(records[0].value, 5);
    }

    #[test]
    fn test_repeated_recordings_accumulate() {
        let db = test_db();
        db.record_metric("j1", "a1", d("2026-01-05"), "pdf", 2)
            .unwrap();
        db.record_metric("j1", "a1", d("2026-01-05"), "pdf", 3)
            .unwrap();

        let records = db
            .fetch_metrics("j1", &DateRange::all_time(), Granularity::Day)
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, 5);
    }

    #[test]
    fn test_fetch_filters_by_range_and_scope() {
        let db = test_db();
        db.record_metric("j1", "a1", d("2026-01-05"), "pdf", 1)
            .unwrap();
        db.record_metric("j1", "a1", d("2026-02-05"), "pdf", 1)
            .unwrap();
        db.record_metric("j2", "a1", d("2026-01-05"), "pdf", 1)
            .unwrap();

        let range = DateRange::new(Some(d("2026-01-01")), Some(d("2026-01-31"))).unwrap();
        let records = db.fetch_metrics("j1", &range, Granularity::Day).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].day, d("2026-01-05"));
    }

    #[test]
    fn test_fetch_preserves_insertion_order() {
        let db = test_db();
        for entity in ["zeta", "alpha", "mid"] {
            db.record_metric("j1", entity, d("2026-01-05"), "pdf", 1)
                .unwrap();
        }

        let records = db
            .fetch_metrics("j1", &DateRange::all_time(), Granularity::Day)
            .unwrap();
        let order: Vec<&str> = records.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(order, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_unknown_scope_is_empty_not_error() {
        let db = test_db();
        let records = db
            .fetch_metrics("no-such-scope", &DateRange::all_time(), Granularity::Day)
            .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_entity_lookup() {
        let db = test_db();
        db.upsert_entity("a1", "On the Care of Manuscripts").unwrap();

        let display = db.resolve("a1").unwrap().unwrap();
        assert_eq!(display.title, "On the Care of Manuscripts");
        assert!(db.resolve("missing").unwrap().is_none());

        // Upsert replaces the title
        db.upsert_entity("a1", "Revised Title").unwrap();
        assert_eq!(db.resolve("a1").unwrap().unwrap().title, "Revised Title");
    }
}
