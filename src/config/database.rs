//! Database configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// URL that selects the in-memory store instead of PostgreSQL.
pub const IN_MEMORY_URL: &str = "memory://";

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL, or `memory://`
    #[serde(default = "default_url")]
    pub url: String,

    /// Minimum connections to maintain
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Maximum connections allowed
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Idle connection timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Run migrations on startup
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.url == IN_MEMORY_URL
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Validate database configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE__URL"));
        }
        if self.is_in_memory() {
            return Ok(());
        }
        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.max_connections > 100 {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            run_migrations: default_run_migrations(),
        }
    }
}

fn default_url() -> String {
    IN_MEMORY_URL.to_string()
}

fn default_min_connections() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_run_migrations() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_defaults() {
        let config = DatabaseConfig::default();
        assert!(config.is_in_memory());
        assert_eq!(config.max_connections, 10);
        assert!(config.run_migrations);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_durations() {
        let config = DatabaseConfig {
            acquire_timeout_secs: 10,
            idle_timeout_secs: 300,
            ..Default::default()
        };
        assert_eq!(config.acquire_timeout(), Duration::from_secs(10));
        assert_eq!(config.idle_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_validation_missing_url() {
        let config = DatabaseConfig {
            url: String::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::MissingRequired(_))));
    }

    #[test]
    fn test_validation_invalid_url() {
        let config = DatabaseConfig {
            url: "mysql://localhost/test".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidDatabaseUrl)));
    }

    #[test]
    fn test_validation_invalid_pool_size() {
        let config = DatabaseConfig {
            url: "postgresql://localhost/test".to_string(),
            min_connections: 20,
            max_connections: 5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidPoolSize)));
    }

    #[test]
    fn test_validation_pool_too_large() {
        let config = DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 500,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::PoolSizeTooLarge)));
    }
}
