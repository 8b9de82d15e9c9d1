//! Database module for PostgreSQL persistence

pub mod migrations;
pub mod models;
pub mod repository;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

// Environment variable names
pub const ENV_POSTGRES_HOST: &str = "POSTGRES_HOST";
pub const ENV_POSTGRES_PORT: &str = "POSTGRES_PORT";
pub const ENV_POSTGRES_USER: &str = "POSTGRES_USER";
pub const ENV_POSTGRES_PASSWORD: &str = "POSTGRES_PASSWORD";
pub const ENV_POSTGRES_DB: &str = "POSTGRES_DB";

// Default values
const DEFAULT_POSTGRES_HOST: &str = "localhost";
const DEFAULT_POSTGRES_PORT: u16 = 5432;
const DEFAULT_POSTGRES_USER: &str = "postgres";
const DEFAULT_POSTGRES_PASSWORD: &str = "postgres";
const DEFAULT_POSTGRES_DB: &str = "pdx";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Invalid {name} value: {value}")]
    InvalidSetting { name: &'static str, value: String },

    #[error("Record not found: {0}")]
    NotFound(String),
}

/// PostgreSQL connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_POSTGRES_HOST.to_string(),
            port: DEFAULT_POSTGRES_PORT,
            user: DEFAULT_POSTGRES_USER.to_string(),
            password: DEFAULT_POSTGRES_PASSWORD.to_string(),
            database: DEFAULT_POSTGRES_DB.to_string(),
        }
    }
}

impl DbConfig {
    /// Read the `POSTGRES_*` settings through `lookup`, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup(ENV_POSTGRES_PORT) {
            Some(raw) => raw.trim().parse().map_err(|_| DbError::InvalidSetting {
                name: ENV_POSTGRES_PORT,
                value: raw,
            })?,
            None => defaults.port,
        };

        Ok(Self {
            host: lookup(ENV_POSTGRES_HOST).unwrap_or(defaults.host),
            port,
            user: lookup(ENV_POSTGRES_USER).unwrap_or(defaults.user),
            password: lookup(ENV_POSTGRES_PASSWORD).unwrap_or(defaults.password),
            database: lookup(ENV_POSTGRES_DB).unwrap_or(defaults.database),
        })
    }

    /// Read the settings from the process environment
    pub fn from_env() -> Result<Self, DbError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

/// Create a new database connection pool
pub async fn create_pool(config: &DbConfig) -> Result<PgPool, DbError> {
    tracing::debug!(host = %config.host, port = config.port, database = %config.database, "Connecting to PostgreSQL");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_with(config.connect_options())
        .await?;

    tracing::info!(host = %config.host, port = config.port, "PostgreSQL connection established");

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DbConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, DbConfig::default());
        assert_eq!(config.port, 5432);
    }

    #[test]
    fn test_values_from_lookup() {
        let config = DbConfig::from_lookup(lookup_from(&[
            ("POSTGRES_HOST", "db.internal"),
            ("POSTGRES_PORT", "6543"),
            ("POSTGRES_USER", "etl"),
            ("POSTGRES_PASSWORD", "s3cret"),
            ("POSTGRES_DB", "dsst"),
        ]))
        .unwrap();

        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 6543);
        assert_eq!(config.user, "etl");
        assert_eq!(config.database, "dsst");
        assert!(!format!("{:?}", config).contains("s3cret"));
    }

    #[test]
    fn test_invalid_port() {
        let err = DbConfig::from_lookup(lookup_from(&[("POSTGRES_PORT", "not-a-port")])).unwrap_err();
        assert!(matches!(err, DbError::InvalidSetting { name: "POSTGRES_PORT", .. }));
    }

    #[tokio::test]
    #[ignore] // Requires a running PostgreSQL
    async fn test_create_pool() {
        let config = DbConfig::from_env().unwrap();
        let pool = create_pool(&config).await.unwrap();
        let (one,): (i32,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await.unwrap();
        assert_eq!(one, 1);
    }
}
