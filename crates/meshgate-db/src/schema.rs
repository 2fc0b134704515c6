//! Schema definitions and migration runner for SurrealDB.
//!
//! Tables are SCHEMAFULL. The account aggregate is stored as one JSON
//! document per account; activity events are append-only rows.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "accounts_and_activity",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Accounts: whole aggregate, keyed by account ID
-- =======================================================================
DEFINE TABLE account SCHEMAFULL;
DEFINE FIELD data ON TABLE account TYPE string;
DEFINE FIELD serial ON TABLE account TYPE int;
DEFINE FIELD updated_at ON TABLE account TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Activity events (append-only)
-- =======================================================================
DEFINE TABLE activity_event SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD seq ON TABLE activity_event TYPE int;
DEFINE FIELD activity ON TABLE activity_event TYPE int;
DEFINE FIELD timestamp ON TABLE activity_event TYPE datetime;
DEFINE FIELD initiator_id ON TABLE activity_event TYPE string;
DEFINE FIELD target_id ON TABLE activity_event TYPE string;
DEFINE FIELD account_id ON TABLE activity_event TYPE string;
DEFINE FIELD meta ON TABLE activity_event TYPE string DEFAULT '';
DEFINE INDEX idx_activity_seq ON TABLE activity_event \
    COLUMNS seq UNIQUE;
DEFINE INDEX idx_activity_account_time ON TABLE activity_event \
    COLUMNS account_id, timestamp;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Apply every migration newer than the recorded schema version.
///
/// Safe to call on every start: the tracking table is created with
/// `IF NOT EXISTS` and applied versions are skipped.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);
    debug!(current_version, "Schema version");

    for migration in MIGRATIONS
        .iter()
        .filter(|m| m.version > current_version)
    {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(window[0].version < window[1].version);
        }
    }

    #[test]
    fn activity_table_is_append_only() {
        assert!(SCHEMA_V1.contains("FOR update NONE"));
        assert!(SCHEMA_V1.contains("FOR delete NONE"));
    }
}
