use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Collection endpoint of the task store when nothing else is configured.
pub const DEFAULT_TASK_API_URL: &str = "http://localhost:8080/toDoList";

/// Default minimum time the busy indicator stays up after a create.
pub const DEFAULT_MIN_CREATE_BUSY_MS: u64 = 4000;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `config.toml`
    #[serde(skip, default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Task store connection settings
    pub services: ServiceConfig,

    /// Front-end behaviour
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Collection endpoint of the task store (items live at `{url}/{id}`)
    pub task_api_url: String,

    /// Per-request timeout applied by the HTTP client
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Minimum busy period after creating a task, in milliseconds. 0 disables it.
    #[serde(default = "default_min_create_busy_ms")]
    pub min_create_busy_ms: u64,
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tasklist")
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_min_create_busy_ms() -> u64 {
    DEFAULT_MIN_CREATE_BUSY_MS
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            task_api_url: DEFAULT_TASK_API_URL.to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            min_create_busy_ms: default_min_create_busy_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            services: ServiceConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let mut config = Self::default();
            if let Some(parent) = path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        if let Some(parent) = path.parent() {
            config.config_dir = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Validate the configuration, logging warnings and failing on errors.
    pub fn ensure_valid(&self) -> Result<ValidationResult> {
        let validation = self.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(validation)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        validate_url(
            &self.services.task_api_url,
            "services.task_api_url",
            &mut result,
        );

        if self.services.request_timeout_secs == 0 {
            result.add_error(
                "services.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        } else if self.services.request_timeout_secs > 300 {
            result.add_warning(
                "services.request_timeout_secs",
                "Request timeout is unusually long (>300s)",
            );
        }

        if self.ui.min_create_busy_ms > 60_000 {
            result.add_warning(
                "ui.min_create_busy_ms",
                "Minimum busy period is longer than a minute",
            );
        }

        result
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the default path to the configuration file
    pub fn config_path() -> PathBuf {
        default_config_dir().join("config.toml")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.services.request_timeout_secs)
    }

    pub fn min_create_busy(&self) -> Duration {
        Duration::from_millis(self.ui.min_create_busy_ms)
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }

            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }

            if url.port() == Some(0) {
                result.add_error(field_name, "Port cannot be 0");
            }

            if url.query().is_some() {
                result.add_warning(field_name, "Query string will be ignored");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}
