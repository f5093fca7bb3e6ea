//! Work item schema migrations.
//!
//! # Responsibility
//! - Keep the ordered list of schema scripts.
//! - Bring a connection from its stamped version up to [`latest_version`].
//!
//! # Invariants
//! - Versions are strictly increasing and start at 1.
//! - All pending scripts run in one transaction; a failing script leaves the
//!   stamped version untouched.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::{Connection, Transaction};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "work_items",
    sql: include_str!("0001_work_items.sql"),
}];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Reads the schema version stamped on the connection.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Migrates `conn` to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is newer than this build.
/// - `MigrationFailed` naming the first script that did not apply.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let latest = latest_version();

    match from_version.cmp(&latest) {
        Ordering::Greater => {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version: from_version,
                latest_supported: latest,
            })
        }
        Ordering::Equal => return Ok(()),
        Ordering::Less => {}
    }

    let tx = conn.transaction()?;
    for migration in pending_after(from_version) {
        run_migration(&tx, migration)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        from_version, latest
    );
    Ok(())
}

fn pending_after(version: u32) -> &'static [Migration] {
    let first_pending = MIGRATIONS.partition_point(|migration| migration.version <= version);
    &MIGRATIONS[first_pending..]
}

fn run_migration(tx: &Transaction<'_>, migration: &Migration) -> DbResult<()> {
    tx.execute_batch(migration.sql)
        .and_then(|()| tx.pragma_update(None, "user_version", migration.version))
        .map_err(|source| DbError::MigrationFailed {
            version: migration.version,
            name: migration.name,
            source,
        })?;

    debug!(
        "event=db_migrate_step module=db status=ok version={} name={}",
        migration.version, migration.name
    );
    Ok(())
}
