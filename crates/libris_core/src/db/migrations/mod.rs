//! Catalog schema steps.
//!
//! Each step is a SQL script tagged with the `user_version` it produces.
//! Pending steps run inside one transaction, so a failing step leaves the
//! file at the version it had before `open_db` was called.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;

/// (resulting version, script). Versions must be strictly increasing.
const SCHEMA_STEPS: &[(u32, &str)] = &[(1, include_str!("0001_catalog.sql"))];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |(version, _)| *version)
}

/// Reads the schema version recorded in the file; 0 for a fresh database.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Brings the catalog schema up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is ahead of this build.
/// - `MigrationFailed` naming the first step whose script errored.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    let supported = latest_version();
    if found > supported {
        warn!("event=db_migrate module=db status=rejected found={found} supported={supported}");
        return Err(DbError::UnsupportedSchemaVersion { found, supported });
    }

    let pending: Vec<_> = SCHEMA_STEPS
        .iter()
        .filter(|(version, _)| *version > found)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for &&(version, script) in &pending {
        tx.execute_batch(script)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| {
                warn!("event=db_migrate module=db status=error step={version} error={source}");
                DbError::MigrationFailed { version, source }
            })?;
        info!("event=db_migrate module=db status=step_ok step={version}");
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={found} to_version={supported}");
    Ok(())
}
