//! # Database Migrations
//!
//! Embedded SQL migrations for the PDV store.
//!
//! The `sqlx::migrate!()` macro embeds every file from
//! `migrations/sqlite/` into the binary at compile time; applied
//! migrations are tracked in `_sqlx_migrations`, so running them is
//! idempotent and ordered.
//!
//! ## Adding New Migrations
//! 1. Create `migrations/sqlite/NNN_description.sql` with the next
//!    sequence number.
//! 2. Never modify an existing migration; always add a new one.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending migrations. Safe to call repeatedly.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("checking for pending migrations");
    MIGRATOR.run(pool).await?;
    info!("all migrations applied");
    Ok(())
}

/// Returns `(embedded, applied)` migration counts, for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);
    Ok((total, applied as usize))
}
