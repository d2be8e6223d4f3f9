mod error;
pub mod repos;
pub mod sqlite;

#[cfg(test)]
pub mod tests;

use std::sync::Arc;

pub use error::{DbError, DbResult};
pub use repos::*;

use crate::config::DatabaseConfig;

/// Cached repository trait objects, created once at startup.
struct CachedRepos {
    locations: Arc<dyn LocationRepo>,
    events: Arc<dyn EventRepo>,
    rate_configs: Arc<dyn RateConfigRepo>,
    analytics_cache: Arc<dyn AnalyticsCacheRepo>,
}

/// Database pool and repository facade.
///
/// Repositories are trait objects so a second backend can slot in behind
/// the same seams; only SQLite is implemented today.
pub struct DbPool {
    pool: sqlx::SqlitePool,
    repos: CachedRepos,
}

impl DbPool {
    /// Create a DbPool from an existing SQLite pool.
    /// Primarily useful for testing.
    pub fn from_sqlite(pool: sqlx::SqlitePool) -> Self {
        let repos = CachedRepos {
            locations: Arc::new(sqlite::SqliteLocationRepo::new(pool.clone())),
            events: Arc::new(sqlite::SqliteEventRepo::new(pool.clone())),
            rate_configs: Arc::new(sqlite::SqliteRateConfigRepo::new(pool.clone())),
            analytics_cache: Arc::new(sqlite::SqliteAnalyticsCacheRepo::new(pool.clone())),
        };
        DbPool { pool, repos }
    }

    /// Create a database pool from configuration.
    pub async fn from_config(config: &DatabaseConfig) -> DbResult<Self> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(
                sqlx::sqlite::SqliteConnectOptions::new()
                    .filename(&config.path)
                    .create_if_missing(config.create_if_missing)
                    .journal_mode(if config.wal_mode {
                        sqlx::sqlite::SqliteJournalMode::Wal
                    } else {
                        sqlx::sqlite::SqliteJournalMode::Delete
                    })
                    .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms)),
            )
            .await?;

        Ok(Self::from_sqlite(pool))
    }

    /// Run migrations with sqlx's runner; manages its own `_sqlx_migrations`
    /// table.
    pub async fn run_migrations(&self) -> DbResult<()> {
        tracing::info!("Running SQLite migrations");
        sqlx::migrate!("./migrations_sqlx/sqlite")
            .run(&self.pool)
            .await?;
        tracing::info!("SQLite migrations completed successfully");
        Ok(())
    }

    /// Get location roster repository
    pub fn locations(&self) -> Arc<dyn LocationRepo> {
        Arc::clone(&self.repos.locations)
    }

    /// Get raw event repository
    pub fn events(&self) -> Arc<dyn EventRepo> {
        Arc::clone(&self.repos.events)
    }

    /// Get rate configuration repository
    pub fn rate_configs(&self) -> Arc<dyn RateConfigRepo> {
        Arc::clone(&self.repos.rate_configs)
    }

    /// Get analytics cache repository
    pub fn analytics_cache(&self) -> Arc<dyn AnalyticsCacheRepo> {
        Arc::clone(&self.repos.analytics_cache)
    }

    /// Health check for database connectivity
    pub async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
