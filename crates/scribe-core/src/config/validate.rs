//! Configuration validation: required credentials and range checks.

use crate::error::ConfigError;

use super::{Config, TEMPLATE_PLACEHOLDERS};

impl Config {
    /// Validate that credentials are present and values are in range.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        require("vision.endpoint", &self.vision.endpoint)?;
        require("vision.api_key", &self.vision.api_key)?;
        require("openai.endpoint", &self.openai.endpoint)?;
        require("openai.api_key", &self.openai.api_key)?;
        require("openai.deployment_name", &self.openai.deployment_name)?;
        require("openai.api_version", &self.openai.api_version)?;

        require_http_url("vision.endpoint", &self.vision.endpoint)?;
        require_http_url("openai.endpoint", &self.openai.endpoint)?;

        if !(0.0..=2.0).contains(&self.openai.temperature) {
            return Err(ConfigError::ValidationError(
                "openai.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.openai.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "openai.max_tokens must be > 0".into(),
            ));
        }
        if self.limits.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

fn require(field: &str, value: &str) -> Result<(), ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::ValidationError(format!("{field} is required")));
    }
    if TEMPLATE_PLACEHOLDERS.contains(&value) {
        return Err(ConfigError::ValidationError(format!(
            "{field} still holds the template placeholder; edit the config file"
        )));
    }
    Ok(())
}

fn require_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("https://") || value.starts_with("http://") {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{field} must be an http(s) URL, got {value:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::template();
        config.vision.endpoint = "https://vision.example.com/".into();
        config.vision.api_key = "vkey".into();
        config.openai.endpoint = "https://openai.example.com/".into();
        config.openai.api_key = "okey".into();
        config
    }

    #[test]
    fn test_valid_config_passes_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_template_fails_validation() {
        let err = Config::template().validate().unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn test_template_endpoint_alone_is_rejected() {
        let mut config = valid_config();
        config.openai.endpoint = Config::template().openai.endpoint;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("openai.endpoint"));
    }

    #[test]
    fn test_real_values_resembling_placeholders_pass() {
        let mut config = valid_config();
        config.openai.endpoint = "https://tryyour-ai.openai.azure.com/".into();
        config.vision.api_key = "your-team-key-7f3a".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_key() {
        let mut config = valid_config();
        config.vision.api_key = "  ".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("vision.api_key"));
    }

    #[test]
    fn test_validate_rejects_missing_deployment() {
        let mut config = valid_config();
        config.openai.deployment_name = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("deployment_name"));
    }

    #[test]
    fn test_validate_rejects_non_url_endpoint() {
        let mut config = valid_config();
        config.openai.endpoint = "openai.example.com".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("openai.endpoint"));
    }

    #[test]
    fn test_validate_rejects_bad_temperature() {
        let mut config = valid_config();
        config.openai.temperature = 2.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = valid_config();
        config.openai.max_tokens = 0;
        assert!(config.validate().unwrap_err().to_string().contains("max_tokens"));

        let mut config = valid_config();
        config.limits.request_timeout_ms = 0;
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("request_timeout_ms"));
    }
}
