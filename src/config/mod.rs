//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `QC_RELEASE` prefix and
//! `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use qc_release::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod gateway;
mod pipeline;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use gateway::GatewayConfig;
pub use pipeline::{CatalogConfig, EvaluationConfig, ReleaseConfig};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section except `database` has working defaults, so an empty
/// environment yields a single process hosting all three services on
/// in-memory storage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL; absent means in-memory repositories
    pub database: Option<DatabaseConfig>,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Reads `.env` if present, then `QC_RELEASE__*` variables:
    ///
    /// - `QC_RELEASE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `QC_RELEASE__DATABASE__URL=...` -> `database.url = ...`
    /// - `QC_RELEASE__GATEWAY__INVENTORY_URL=...` -> `gateway.inventory_url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value cannot be parsed into its field type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("QC_RELEASE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration sections
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        self.gateway.validate()?;
        self.release.validate()?;
        self.evaluation.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; tests touching them run one at a time.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "QC_RELEASE__SERVER__PORT",
        "QC_RELEASE__SERVER__SERVICES",
        "QC_RELEASE__SERVER__ENVIRONMENT",
        "QC_RELEASE__DATABASE__URL",
        "QC_RELEASE__GATEWAY__INVENTORY_URL",
        "QC_RELEASE__RELEASE__REVIEW_WINDOW_DAYS",
        "QC_RELEASE__CATALOG__REQUIRE_UNIQUE_CODES",
    ];

    fn load_with(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        for (key, value) in vars {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        for key in VARS {
            env::remove_var(key);
        }
        result
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[]).unwrap();

        assert!(config.database.is_none());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert!(config.catalog.require_unique_codes);
        assert_eq!(config.release.review_window_days, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nested_values_are_read() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("QC_RELEASE__SERVER__PORT", "3000"),
            ("QC_RELEASE__SERVER__SERVICES", "qa"),
            ("QC_RELEASE__DATABASE__URL", "postgresql://qc@localhost/qc"),
            ("QC_RELEASE__GATEWAY__INVENTORY_URL", "http://inventory:8080"),
            ("QC_RELEASE__RELEASE__REVIEW_WINDOW_DAYS", "7"),
            ("QC_RELEASE__CATALOG__REQUIRE_UNIQUE_CODES", "false"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.services, "qa");
        assert_eq!(
            config.database.as_ref().map(|d| d.url.as_str()),
            Some("postgresql://qc@localhost/qc")
        );
        assert_eq!(
            config.gateway.inventory_url.as_deref(),
            Some("http://inventory:8080")
        );
        assert_eq!(config.release.review_window_days, 7);
        assert!(!config.catalog.require_unique_codes);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn production_flag() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[("QC_RELEASE__SERVER__ENVIRONMENT", "production")]).unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn invalid_database_section_fails_validation() {
        let config = AppConfig {
            database: Some(DatabaseConfig {
                url: "mysql://localhost/qc".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidDatabaseUrl));
    }
}
