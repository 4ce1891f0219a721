//! Configuration management for Scribe.
//!
//! Credentials for both cloud services are read from a JSON file
//! (`config.json` in the working directory unless `--config` says otherwise).
//! The loaded `Config` is immutable and handed by reference to whatever
//! needs it; there is no process-wide configuration state.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file used when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Root configuration structure for Scribe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Image analysis service
    pub vision: VisionConfig,

    /// Chat-completion deployment
    pub openai: OpenAiConfig,

    /// Request limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

const TEMPLATE_VISION_ENDPOINT: &str = "https://your-vision-service.cognitiveservices.azure.com/";
const TEMPLATE_VISION_KEY: &str = "your-vision-api-key";
const TEMPLATE_OPENAI_ENDPOINT: &str = "https://your-openai-service.openai.azure.com/";
const TEMPLATE_OPENAI_KEY: &str = "your-openai-api-key";

/// Credential values written by [`Config::template`] that must be replaced.
pub(crate) const TEMPLATE_PLACEHOLDERS: [&str; 4] = [
    TEMPLATE_VISION_ENDPOINT,
    TEMPLATE_VISION_KEY,
    TEMPLATE_OPENAI_ENDPOINT,
    TEMPLATE_OPENAI_KEY,
];

impl Config {
    /// Load and validate configuration from a file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_json::from_str(content)?;
        config.resolve_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Template with placeholder credentials, written for first-time users.
    pub fn template() -> Self {
        Self {
            vision: VisionConfig {
                endpoint: TEMPLATE_VISION_ENDPOINT.to_string(),
                api_key: TEMPLATE_VISION_KEY.to_string(),
                ..VisionConfig::default()
            },
            openai: OpenAiConfig {
                endpoint: TEMPLATE_OPENAI_ENDPOINT.to_string(),
                api_key: TEMPLATE_OPENAI_KEY.to_string(),
                deployment_name: "gpt-4o".to_string(),
                ..OpenAiConfig::default()
            },
            limits: LimitsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Write the template config to `path`. Never overwrites an existing file.
    pub fn write_template(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::TemplateExists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&Self::template())?;
        std::fs::write(path, json)?;
        tracing::info!("Template config written to {:?}", path);
        Ok(())
    }

    /// Per-request timeout shared by both service adapters.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.limits.request_timeout_ms)
    }

    /// Replace `${ENV_VAR}` key references with their values.
    fn resolve_env_vars(&mut self) -> Result<(), ConfigError> {
        self.vision.api_key = resolve_env_var("vision.api_key", &self.vision.api_key)?;
        self.openai.api_key = resolve_env_var("openai.api_key", &self.openai.api_key)?;
        Ok(())
    }
}

/// Resolve a `${ENV_VAR}` reference; plain strings pass through unchanged.
pub fn resolve_env_var(field: &str, value: &str) -> Result<String, ConfigError> {
    match value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
        Some(var_name) => std::env::var(var_name).map_err(|_| {
            ConfigError::ValidationError(format!(
                "{field} references ${{{var_name}}} but that environment variable is not set"
            ))
        }),
        None => Ok(value.to_string()),
    }
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(&path_str);
    PathBuf::from(expanded.into_owned())
}
