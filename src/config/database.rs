use serde::{Deserialize, Serialize};

use super::ConfigError;

/// SQLite database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file. `:memory:` is accepted for
    /// throwaway deployments.
    #[serde(default = "default_path")]
    pub path: String,

    /// Create the database file if it does not exist.
    #[serde(default = "default_true")]
    pub create_if_missing: bool,

    /// Run pending migrations on startup.
    #[serde(default = "default_true")]
    pub run_migrations: bool,

    /// Use WAL journaling. Leave on unless the database lives on a
    /// filesystem that cannot support it.
    #[serde(default = "default_true")]
    pub wal_mode: bool,

    /// How long a connection waits on a locked database before erroring.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum pool connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            create_if_missing: true,
            run_migrations: true,
            wal_mode: true,
            busy_timeout_ms: default_busy_timeout_ms(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.is_empty() {
            return Err(ConfigError::Validation(
                "database.path must not be empty".into(),
            ));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_path() -> String {
    "tollgate.db".to_string()
}

fn default_true() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_max_connections() -> u32 {
    5
}
