//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! Numeric ids are the record ids themselves, allocated from the
//! `counter` table. Enums are stored as strings with ASSERT
//! constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

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
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Id counters (one row per table)
-- =======================================================================
DEFINE TABLE counter SCHEMAFULL;
DEFINE FIELD value ON TABLE counter TYPE int DEFAULT 0;

-- =======================================================================
-- Tenants (one wedding each; the isolation boundary)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD slug ON TABLE tenant TYPE string;
DEFINE FIELD bride_name ON TABLE tenant TYPE string;
DEFINE FIELD groom_name ON TABLE tenant TYPE string;
DEFINE FIELD wedding_date ON TABLE tenant TYPE datetime;
DEFINE FIELD venue_name ON TABLE tenant TYPE string;
DEFINE FIELD venue_address ON TABLE tenant TYPE string;
DEFINE FIELD venue_map_link ON TABLE tenant TYPE option<string>;
DEFINE FIELD primary_color ON TABLE tenant TYPE string;
DEFINE FIELD secondary_color ON TABLE tenant TYPE string;
DEFINE FIELD email ON TABLE tenant TYPE option<string>;
DEFINE FIELD phone ON TABLE tenant TYPE option<string>;
DEFINE FIELD is_active ON TABLE tenant TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_slug ON TABLE tenant COLUMNS slug UNIQUE;

-- =======================================================================
-- Guests (tenant scope)
-- =======================================================================
DEFINE TABLE guest SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE guest TYPE int;
DEFINE FIELD name ON TABLE guest TYPE string;
DEFINE FIELD relationship ON TABLE guest TYPE string;
DEFINE FIELD attendance ON TABLE guest TYPE string \
    ASSERT $value IN ['yes', 'no', 'maybe'];
DEFINE FIELD message ON TABLE guest TYPE option<string>;
DEFINE FIELD created_at ON TABLE guest TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE guest TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_guest_tenant ON TABLE guest COLUMNS tenant_id;

-- =======================================================================
-- Media files (tenant scope)
-- =======================================================================
DEFINE TABLE media_file SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE media_file TYPE int;
DEFINE FIELD kind ON TABLE media_file TYPE string \
    ASSERT $value IN ['image', 'music', 'other'];
DEFINE FIELD url ON TABLE media_file TYPE string;
DEFINE FIELD display_name ON TABLE media_file TYPE option<string>;
DEFINE FIELD display_order ON TABLE media_file TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE media_file TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_media_tenant_kind ON TABLE media_file \
    COLUMNS tenant_id, kind;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
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

            // Record the applied migration.
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

            info!(version = migration.version, "Migration applied successfully");
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
