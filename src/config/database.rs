use crate::core::{AppError, Result};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::env;
use std::time::Duration;

/// Where transaction records are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerBackend {
    MySql,
    /// Process-local ledger for development; lost on restart
    Memory,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: LedgerBackend,
    pub url: Option<String>,
    pub pool_size: u32,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        let backend = match env::var("LEDGER_BACKEND")
            .unwrap_or_else(|_| "mysql".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "mysql" => LedgerBackend::MySql,
            "memory" => LedgerBackend::Memory,
            other => {
                return Err(AppError::Configuration(format!(
                    "Invalid LEDGER_BACKEND '{}'",
                    other
                )))
            }
        };

        Ok(DatabaseConfig {
            backend,
            url: env::var("DATABASE_URL").ok(),
            pool_size: env::var("DATABASE_POOL_SIZE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| AppError::configuration("Invalid DATABASE_POOL_SIZE"))?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| AppError::configuration("Invalid DATABASE_MAX_CONNECTIONS"))?,
        })
    }

    /// Create a MySQL connection pool
    pub async fn create_pool(&self) -> Result<MySqlPool> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| AppError::configuration("DATABASE_URL not set"))?;

        MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.pool_size.min(self.max_connections))
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600)) // 10 minutes
            .max_lifetime(Duration::from_secs(1800)) // 30 minutes
            .test_before_acquire(true)
            .connect(url)
            .await
            .map_err(AppError::Database)
    }

    /// Apply pending schema migrations
    pub async fn run_migrations(pool: &MySqlPool) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))
    }
}
