//! Configuration validation utilities

use super::error::ValidationError;
use super::schema::ClientConfig;
use url::Url;

/// Configuration validator with rules beyond the built-in field checks
pub struct ConfigValidator {
    /// Schemes accepted for the endpoint
    allowed_schemes: Vec<&'static str>,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            allowed_schemes: vec!["https", "http"],
        }
    }

    /// Validate a configuration with extended rules
    pub fn validate(&self, config: &ClientConfig) -> Result<(), ValidationError> {
        config.validate()?;
        self.validate_endpoint(config)?;
        Ok(())
    }

    /// The base URL must parse, use an allowed scheme, and carry a host
    fn validate_endpoint(&self, config: &ClientConfig) -> Result<(), ValidationError> {
        let url = Url::parse(&config.base_url)
            .map_err(|e| ValidationError::invalid_url("base_url", e.to_string()))?;

        if !self.allowed_schemes.contains(&url.scheme()) {
            return Err(ValidationError::invalid_url(
                "base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            )
            .with_context("expected https or http"));
        }

        if url.host_str().is_none() {
            return Err(ValidationError::invalid_url("base_url", "missing host"));
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(ValidationError::invalid_url(
                "base_url",
                "query strings and fragments belong in neither base_url nor api_path",
            ));
        }

        Ok(())
    }
}
