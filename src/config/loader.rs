//! Configuration Loader
//!
//! Environment-aware configuration loading. Sources are merged in order,
//! later ones overriding earlier ones:
//!
//! 1. `{config_dir}/default.toml` (optional)
//! 2. `{config_dir}/{environment}.toml` (optional)
//! 3. `TEXT_EXTRACTOR__SECTION__KEY` environment variables

use super::error::{ConfigResult, ConfigurationError};
use super::TextExtractorConfig;
use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const ENV_PREFIX: &str = "TEXT_EXTRACTOR";
const CONFIG_DIR_VAR: &str = "TEXT_EXTRACTOR_CONFIG_DIR";

pub struct ConfigManager {
    config: TextExtractorConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment.
    /// Useful for testing without modifying global environment variables.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            environment = %environment,
            directory = %config_directory.display(),
            "Loading configuration"
        );

        let config = Self::build(&config_directory, environment)?;

        debug!(
            environment = %environment,
            config = %config.sanitized(),
            "Configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    fn build(config_directory: &Path, environment: &str) -> ConfigResult<TextExtractorConfig> {
        let settings = Config::builder()
            .add_source(File::from(config_directory.join("default.toml")).required(false))
            .add_source(
                File::from(config_directory.join(format!("{environment}.toml"))).required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigurationError::load_error(environment, e))?;

        settings
            .try_deserialize::<TextExtractorConfig>()
            .map_err(ConfigurationError::deserialize_error)
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &TextExtractorConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Current environment from `TEXT_EXTRACTOR_ENV` or `APP_ENV`
    pub fn detect_environment() -> String {
        env::var("TEXT_EXTRACTOR_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }

    fn default_config_directory() -> PathBuf {
        env::var(CONFIG_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }
}
