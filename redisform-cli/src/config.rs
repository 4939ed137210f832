/// Configuration management for the CLI
///
/// Settings are layered, later sources winning:
///
/// 1. `redisform.toml` in the working directory (optional), or the file
///    passed with `--config` (required if given)
/// 2. `REDISFORM_*` environment variables
/// 3. Command-line flags
///
/// When no layer sets `redis_url`, the provider falls back to `REDIS_URL`.
///
/// # Environment Variables
///
/// - `REDISFORM_REDIS_URL`: Redis connection URL
/// - `REDISFORM_LOG_FORMAT`: `text` or `json` (default: text)
/// - `REDIS_URL`: fallback connection URL
/// - `RUST_LOG`: Log filter (default: info for redisform crates)
///
/// # Example
///
/// ```no_run
/// use redisform_cli::config::CliConfig;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = CliConfig::load(None)?;
/// println!("Logging as {:?}", config.log_format);
/// # Ok(())
/// # }
/// ```

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use redisform_provider::provider::ProviderSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, searched without extension
pub const DEFAULT_CONFIG_FILE: &str = "redisform";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "REDISFORM";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Complete CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Redis connection URL
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Loads configuration from the config file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An explicit config file is missing or malformed
    /// - A setting has an invalid value
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX));

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
        let config = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies command-line flags on top of the loaded settings
    pub fn with_overrides(mut self, redis_url: Option<String>, log_format: Option<LogFormat>) -> Self {
        if redis_url.is_some() {
            self.redis_url = redis_url;
        }
        if let Some(format) = log_format {
            self.log_format = format;
        }
        self
    }

    /// Provider block settings derived from this configuration
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            redis_url: self.redis_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> anyhow::Result<CliConfig> {
        CliConfig::from_builder(config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = from_toml("").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_file_values() {
        let config = from_toml("redis_url = \"redis://cache:6379\"\nlog_format = \"json\"").unwrap();
        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_setting_rejected() {
        assert!(from_toml("redis_uri = \"redis://x\"").is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let config = from_toml("redis_url = \"redis://file:6379\"")
            .unwrap()
            .with_overrides(Some("redis://flag:6379".to_string()), Some(LogFormat::Json));
        assert_eq!(config.redis_url.as_deref(), Some("redis://flag:6379"));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_absent_flags_keep_file_values() {
        let config = from_toml("redis_url = \"redis://file:6379\"")
            .unwrap()
            .with_overrides(None, None);
        assert_eq!(config.provider_settings().redis_url.as_deref(), Some("redis://file:6379"));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let result = CliConfig::load(Some(Path::new("/nonexistent/redisform.toml")));
        assert!(result.is_err());
    }
}
