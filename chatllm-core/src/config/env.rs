//! Environment variable handling for configuration

use super::error::ConfigError;
use super::schema::ClientConfig;
use super::secrets::SecretString;
use regex::Regex;
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

/// Bearer credential
pub const ENV_API_KEY: &str = "KEY";
/// Endpoint base URL override
pub const ENV_ENDPOINT: &str = "CHATLLM_ENDPOINT";
/// Default model override
pub const ENV_MODEL: &str = "CHATLLM_MODEL";
/// Default attempt limit override
pub const ENV_TRIES: &str = "CHATLLM_TRIES";
/// Default temperature override
pub const ENV_TEMPERATURE: &str = "CHATLLM_TEMPERATURE";
/// Per-attempt diagnostics toggle
pub const ENV_DEBUG: &str = "CHATLLM_DEBUG";

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
    })
}

/// Interpolate `${VAR}` references in configuration text from the process environment
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    interpolate_with(content, |name| env::var(name).ok())
}

/// Interpolate `${VAR}` references using `lookup`
pub fn interpolate_with<F>(content: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(content.len());
    let mut last = 0;

    for cap in env_var_pattern().captures_iter(content) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let var_name = &cap[1];
        let value = lookup(var_name).ok_or_else(|| ConfigError::EnvVarNotFound {
            var: var_name.to_string(),
        })?;

        result.push_str(&content[last..full_match.start()]);
        result.push_str(&value);
        last = full_match.end();
    }

    result.push_str(&content[last..]);
    Ok(result)
}

/// Overlay environment settings onto `config`.
///
/// `KEY` sets the credential. The `CHATLLM_*` variables override defaults and
/// are rejected when they do not parse.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(ENV_API_KEY) {
        config.api_key = Some(SecretString::new(key));
    }
    if let Some(endpoint) = lookup(ENV_ENDPOINT) {
        config.base_url = endpoint;
    }
    if let Some(model) = lookup(ENV_MODEL) {
        config.model = model;
    }
    if let Some(tries) = lookup(ENV_TRIES) {
        config.max_attempts = parse_var(ENV_TRIES, &tries)?;
    }
    if let Some(temperature) = lookup(ENV_TEMPERATURE) {
        config.temperature = parse_var(ENV_TEMPERATURE, &temperature)?;
    }
    if let Some(debug) = lookup(ENV_DEBUG) {
        config.diagnostics = parse_flag(&debug).ok_or_else(|| ConfigError::InvalidEnvValue {
            var: ENV_DEBUG.to_string(),
            value: debug.clone(),
            message: "expected one of 1, 0, true, false, on, off".to_string(),
        })?;
    }
    Ok(())
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnvValue {
        var: var.to_string(),
        value: value.to_string(),
        message: e.to_string(),
    })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
