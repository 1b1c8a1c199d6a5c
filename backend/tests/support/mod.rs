//! Shared helpers for integration tests that need a real PostgreSQL.
//!
//! Database creation goes through the `postgres` client because
//! `CREATE DATABASE` cannot run inside the transaction Diesel would open.
//! Schemas come from the embedded Diesel migrations so tests never drift
//! from `backend/migrations/`.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use postgres::{Client, NoTls};
use venue_directory::domain::ports::StoreError;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Render a `postgres` error with its SQLSTATE and server message.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// Drop and recreate `name`, connecting through the maintenance database.
pub fn reset_database(admin_url: &str, name: &str) -> Result<(), StoreError> {
    let mut client = Client::connect(admin_url, NoTls)
        .map_err(|err| StoreError::connection(format_postgres_error(&err)))?;
    client
        .batch_execute(&format!("DROP DATABASE IF EXISTS \"{name}\""))
        .map_err(|err| StoreError::query(format_postgres_error(&err)))?;
    client
        .batch_execute(&format!("CREATE DATABASE \"{name}\""))
        .map_err(|err| StoreError::query(format_postgres_error(&err)))?;
    Ok(())
}

/// Run every pending migration against `url`.
pub fn migrate_schema(url: &str) -> Result<(), StoreError> {
    let mut conn = PgConnection::establish(url)
        .map_err(|err| StoreError::connection(format!("{err:?}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| StoreError::query(format!("migration: {err:?}")))?;
    Ok(())
}

/// Whether `SKIP_TEST_CLUSTER` is set to "1", "true" or "yes".
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip when `SKIP_TEST_CLUSTER` allows it, otherwise fail loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}
