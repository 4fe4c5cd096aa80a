//! Table layout for [`super::SqliteStore`].

use rusqlite::{Connection, OptionalExtension, Transaction};

use super::StoreError;

/// Schema revision written by this build.
pub const SCHEMA_VERSION: i64 = 1;

/// Create the users, interests and compatibilities tables if missing.
///
/// Runs in one transaction. A database stamped with a different
/// [`SCHEMA_VERSION`] is rejected rather than migrated.
pub(super) fn initialise_schema(connection: &mut Connection) -> Result<(), StoreError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| StoreError::Sqlite {
            operation: "enable foreign keys",
            source,
        })?;

    let transaction = connection.transaction().map_err(|source| StoreError::Sqlite {
        operation: "begin schema transaction",
        source,
    })?;

    create_tables(&transaction)?;
    create_indexes(&transaction)?;
    ensure_schema_version(&transaction)?;

    transaction.commit().map_err(|source| StoreError::Sqlite {
        operation: "commit schema transaction",
        source,
    })
}

fn create_tables(transaction: &Transaction<'_>) -> Result<(), StoreError> {
    run_migration_step(
        transaction,
        "create users",
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL CHECK (length(trim(name)) > 0),
            handle TEXT NOT NULL UNIQUE CHECK (length(handle) > 0),
            uni TEXT,
            interests TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        ) WITHOUT ROWID",
    )?;
    run_migration_step(
        transaction,
        "create interests",
        "CREATE TABLE IF NOT EXISTS interests (
            category TEXT NOT NULL CHECK (category IN ('movie', 'tv', 'artist', 'hobby')),
            name TEXT NOT NULL,
            name_lc TEXT NOT NULL CHECK (length(name_lc) > 0),
            image_url TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (category, name_lc)
        ) WITHOUT ROWID",
    )?;
    run_migration_step(
        transaction,
        "create compatibilities",
        "CREATE TABLE IF NOT EXISTS compatibilities (
            pair_key TEXT PRIMARY KEY,
            user_a_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            user_b_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            score INTEGER NOT NULL CHECK (score BETWEEN 0 AND 100),
            breakdown TEXT NOT NULL,
            computed_at INTEGER NOT NULL
        ) WITHOUT ROWID",
    )
}

fn create_indexes(transaction: &Transaction<'_>) -> Result<(), StoreError> {
    run_migration_step(
        transaction,
        "index users by name",
        "CREATE INDEX IF NOT EXISTS idx_users_name ON users(name)",
    )?;
    run_migration_step(
        transaction,
        "index compatibilities by age",
        "CREATE INDEX IF NOT EXISTS idx_compatibilities_computed_at
            ON compatibilities(computed_at)",
    )
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), StoreError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS kindred_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0)
        ) WITHOUT ROWID",
    )?;

    let existing: Option<i64> = transaction
        .query_row(
            "SELECT version FROM kindred_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| StoreError::Sqlite {
            operation: "read schema version",
            source,
        })?;

    match existing {
        Some(found) if found == SCHEMA_VERSION => Ok(()),
        Some(found) => Err(StoreError::SchemaVersion {
            found,
            expected: SCHEMA_VERSION,
        }),
        None => transaction
            .execute(
                "INSERT INTO kindred_schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map(|_| ())
            .map_err(|source| StoreError::Sqlite {
                operation: "record schema version",
                source,
            }),
    }
}

fn run_migration_step(
    transaction: &Transaction<'_>,
    operation: &'static str,
    sql: &str,
) -> Result<(), StoreError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| StoreError::Sqlite { operation, source })
}
