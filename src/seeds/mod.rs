mod demo_salon;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::app::error::AppError;

/// Table recording which seeds have been applied.
pub const SEEDS_TABLE: &str = "_salonbook_seeds";

/// Outcome of running a seed. Skipped seeds are not recorded so they may run again later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Seed executed and made changes; record it.
    Applied,
    /// Seed chose not to run (e.g. env not set); do not record.
    Skipped,
}

/// A database seed. Seeds run in version order and are tracked for idempotency.
#[async_trait]
pub trait Seed: Send + Sync {
    /// Unique version identifier (timestamp format: YYYYMMDDHHMMSS).
    fn version(&self) -> i64;

    fn description(&self) -> &str;

    /// Execute the seed through the db layer and services; no raw SQL.
    async fn run(&self, pool: &SqlitePool) -> Result<SeedOutcome, AppError>;
}

/// All seeds in execution order (sorted by version).
pub fn all_seeds() -> Vec<Box<dyn Seed>> {
    let mut seeds: Vec<Box<dyn Seed>> = vec![Box::new(demo_salon::DemoSalon)];
    seeds.sort_by_key(|s| s.version());
    seeds
}

/// Run all pending seeds against `pool`.
pub async fn run_seeds(pool: &SqlitePool) -> Result<(), AppError> {
    ensure_seeds_table(pool).await?;
    let applied = applied_versions(pool).await?;
    for seed in all_seeds() {
        let version = seed.version();
        if applied.contains(&version) {
            continue;
        }
        match seed.run(pool).await? {
            SeedOutcome::Applied => record_seed(pool, version, seed.description()).await?,
            SeedOutcome::Skipped => {}
        }
    }
    Ok(())
}

pub async fn ensure_seeds_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {SEEDS_TABLE} (
            version INTEGER PRIMARY KEY NOT NULL,
            description TEXT NOT NULL,
            installed_on INTEGER NOT NULL DEFAULT (unixepoch())
        )"
    ))
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(&format!("SELECT version FROM {SEEDS_TABLE}"))
        .fetch_all(pool)
        .await
}

pub async fn record_seed(pool: &SqlitePool, version: i64, description: &str) -> Result<(), sqlx::Error> {
    sqlx::query(&format!("INSERT INTO {SEEDS_TABLE} (version, description) VALUES (?, ?)"))
        .bind(version)
        .bind(description)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn forget_seed(pool: &SqlitePool, version: i64) -> Result<(), sqlx::Error> {
    sqlx::query(&format!("DELETE FROM {SEEDS_TABLE} WHERE version = ?"))
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}
