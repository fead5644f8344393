//! SQLite schema bootstrap.
//!
//! # Invariants
//! - A fresh database (`user_version = 0`) gets the full schema and
//!   `user_version = SCHEMA_VERSION` inside one transaction.
//! - Any other version than `SCHEMA_VERSION` is rejected; files are never
//!   rewritten in place.

use super::{DbError, DbResult};
use rusqlite::Connection;

/// Schema version this build reads and writes.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Creates the schema on a fresh database and checks the version otherwise.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file carries another schema version.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    match current_user_version(conn)? {
        0 => {
            let tx = conn.transaction()?;
            tx.execute_batch(SCHEMA_SQL)?;
            tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
            tx.commit()?;
            Ok(())
        }
        SCHEMA_VERSION => Ok(()),
        other => Err(DbError::UnsupportedSchemaVersion {
            db_version: other,
            supported: SCHEMA_VERSION,
        }),
    }
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
