//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};

/// Image analysis service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Resource endpoint, e.g. `https://my-vision.cognitiveservices.azure.com/`
    pub endpoint: String,

    /// Subscription key (or `${ENV_VAR}` reference)
    pub api_key: String,

    /// Language for captions and tags
    #[serde(default = "default_language")]
    pub language: String,

    /// Analysis model version
    #[serde(default = "default_model_version")]
    pub model_version: String,

    /// Image Analysis REST API version
    #[serde(default = "default_vision_api_version")]
    pub api_version: String,

    /// Ask the service for gender-neutral captions
    #[serde(default)]
    pub gender_neutral_caption: bool,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_model_version() -> String {
    "latest".to_string()
}

fn default_vision_api_version() -> String {
    "2024-02-01".to_string()
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            language: default_language(),
            model_version: default_model_version(),
            api_version: default_vision_api_version(),
            gender_neutral_caption: false,
        }
    }
}

/// Chat-completion deployment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Resource endpoint, e.g. `https://my-openai.openai.azure.com/`
    pub endpoint: String,

    /// API key (or `${ENV_VAR}` reference)
    pub api_key: String,

    /// REST API version
    #[serde(default = "default_openai_api_version")]
    pub api_version: String,

    /// Deployment that serves the chat model
    pub deployment_name: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate per image
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_openai_api_version() -> String {
    "2023-12-01-preview".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            api_version: default_openai_api_version(),
            deployment_name: String::new(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Limits applied to outbound requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Per-request timeout for both services, in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 60_000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
