//! Versioned SQLite schema for exit records.
//!
//! `MIGRATIONS[i]` moves the schema from version `i` to `i + 1`. Applied
//! versions are recorded in `schema_migrations`.

use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::error::{Result, StoreError};

const MIGRATIONS: &[&str] = &[
    // v1: one row per exit id; integers as big-endian blobs.
    r#"
    CREATE TABLE standard_exits (
        exit_id BLOB PRIMARY KEY,
        exitable INTEGER NOT NULL,
        output_related_data_hash BLOB NOT NULL,
        token BLOB NOT NULL,
        exit_target BLOB NOT NULL,
        amount BLOB NOT NULL,
        updated_at INTEGER NOT NULL
    );
    CREATE INDEX idx_standard_exits_exit_target ON standard_exits(exit_target);
    "#,
];

/// Schema version this build writes.
pub const CURRENT_VERSION: u32 = MIGRATIONS.len() as u32;

/// Bring the schema up to [`CURRENT_VERSION`]. Safe to call on every open.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
    )?;
    let applied: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if applied > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "schema version {applied} is ahead of this build ({CURRENT_VERSION})"
        )));
    }
    if applied == CURRENT_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (index, sql) in MIGRATIONS.iter().enumerate().skip(applied as usize) {
        let version = index as u32 + 1;
        debug!(version, "applying exit store migration");
        tx.execute_batch(sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            params![version, now_millis()],
        )?;
    }
    tx.commit()?;
    info!(from = applied, to = CURRENT_VERSION, "exit store schema migrated");
    Ok(())
}

/// Wall-clock milliseconds, for bookkeeping columns only.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(conn: &Connection) -> u32 {
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_fresh_database_gets_exit_table() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let count: u32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'standard_exits'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(version(&conn), CURRENT_VERSION);
    }

    #[test]
    fn test_rerunning_is_a_no_op() {
        let mut conn = Connection::open_in_memory().unwrap();
        for _ in 0..3 {
            migrate(&mut conn).unwrap();
        }
        let rows: u32 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, CURRENT_VERSION);
    }

    #[test]
    fn test_schema_from_newer_build_is_refused() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, 0)",
            params![CURRENT_VERSION + 1],
        )
        .unwrap();

        assert!(matches!(migrate(&mut conn), Err(StoreError::Migration(_))));
    }
}
