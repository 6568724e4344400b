//! Workflow configuration.
//!
//! Configuration is loaded from environment variables with defaults suitable
//! for local development. The role catalog itself can be loaded from a JSON
//! file with [`registry_from_file`].

use crate::retry::RetryConfig;
use platform_rbac::{AuthzError, Registry, RegistryConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },

    /// Registry file could not be read.
    #[error("Failed to read registry file: {0}")]
    Io(#[from] std::io::Error),

    /// Registry file is not valid JSON for a [`RegistryConfig`].
    #[error("Failed to parse registry file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Registry declarations were rejected.
    #[error("Invalid registry: {0}")]
    Registry(#[from] AuthzError),
}

/// Configuration for the [`RoleManager`](crate::RoleManager).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Backoff for store calls.
    pub retry: RetryConfig,

    /// Whether role changes are written to the audit sink.
    pub audit_enabled: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            audit_enabled: true,
        }
    }
}

impl ManagerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RBAC_STORE_MAX_ATTEMPTS`: Attempts per store call (default: 3)
    /// - `RBAC_STORE_RETRY_DELAY_MS`: Delay before the first retry (default: 100)
    /// - `RBAC_STORE_RETRY_MAX_DELAY_MS`: Backoff cap (default: 10000)
    /// - `RBAC_AUDIT_ENABLED`: Whether to write audit entries (default: true)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            retry: RetryConfig {
                max_attempts: env_parse("RBAC_STORE_MAX_ATTEMPTS")
                    .unwrap_or(default.retry.max_attempts),
                initial_delay: env_parse("RBAC_STORE_RETRY_DELAY_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(default.retry.initial_delay),
                max_delay: env_parse("RBAC_STORE_RETRY_MAX_DELAY_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(default.retry.max_delay),
                exponential_base: default.retry.exponential_base,
            },
            audit_enabled: std::env::var("RBAC_AUDIT_ENABLED")
                .map(|s| s != "false" && s != "0")
                .unwrap_or(default.audit_enabled),
        }
    }

    /// Check the configuration for values that would make the workflow misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RBAC_STORE_MAX_ATTEMPTS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.retry.initial_delay > self.retry.max_delay {
            return Err(ConfigError::InvalidValue {
                key: "RBAC_STORE_RETRY_DELAY_MS".to_string(),
                message: format!(
                    "initial delay {}ms exceeds maximum delay {}ms",
                    self.retry.initial_delay.as_millis(),
                    self.retry.max_delay.as_millis()
                ),
            });
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Load and freeze a registry declared in a JSON file.
///
/// The file holds a [`RegistryConfig`]:
///
/// ```json
/// { "scopes": [ { "name": "organization", "roles": [ { "name": "owner", "permissions": ["*"] } ] } ] }
/// ```
pub fn registry_from_file(path: impl AsRef<Path>) -> Result<Registry, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let config = RegistryConfig::from_json(&contents)?;
    let registry = Registry::from_config(&config)?;

    tracing::debug!(
        path = %path.display(),
        scope_types = registry.scope_types().len(),
        "Loaded registry from file"
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ManagerConfig::default();
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.audit_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_env() {
        // Only this test touches these variables.
        std::env::set_var("RBAC_STORE_MAX_ATTEMPTS", "5");
        std::env::set_var("RBAC_STORE_RETRY_DELAY_MS", "not-a-number");
        std::env::set_var("RBAC_AUDIT_ENABLED", "false");

        let config = ManagerConfig::from_env();

        std::env::remove_var("RBAC_STORE_MAX_ATTEMPTS");
        std::env::remove_var("RBAC_STORE_RETRY_DELAY_MS");
        std::env::remove_var("RBAC_AUDIT_ENABLED");

        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_delay, Duration::from_millis(100));
        assert!(!config.audit_enabled);
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = ManagerConfig::default();
        config.retry.max_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_delays() {
        let mut config = ManagerConfig::default();
        config.retry.initial_delay = Duration::from_secs(60);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_registry_from_file() {
        let path = std::env::temp_dir().join(format!("rbac-registry-{}.json", uuid::Uuid::now_v7()));
        std::fs::write(
            &path,
            r#"{"scopes":[{"name":"organization","roles":[{"name":"owner","permissions":["*"],"can_assign":["*"]}]}]}"#,
        )
        .unwrap();

        let registry = registry_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(registry.has_role("owner", "organization"));
    }

    #[test]
    fn test_registry_from_file_errors() {
        let missing = std::env::temp_dir().join("rbac-registry-does-not-exist.json");
        assert!(matches!(registry_from_file(&missing), Err(ConfigError::Io(_))));

        let path = std::env::temp_dir().join(format!("rbac-registry-{}.json", uuid::Uuid::now_v7()));
        std::fs::write(
            &path,
            r#"{"scopes":[{"name":"organization","roles":[{"name":"owner","permissions":["bad pattern"]}]}]}"#,
        )
        .unwrap();
        let result = registry_from_file(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            result,
            Err(ConfigError::Registry(AuthzError::InvalidPermission { .. }))
        ));
    }
}
