// src/config.rs
use std::{fmt, time::Duration};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const MODEL_VAR: &str = "OPENAI_MODEL";
pub const PORT_VAR: &str = "PORT";
pub const MAX_TOKENS_VAR: &str = "CHAT_MAX_TOKENS";
pub const TEMPERATURE_VAR: &str = "CHAT_TEMPERATURE";
pub const TIMEOUT_VAR: &str = "UPSTREAM_TIMEOUT_SECS";
pub const MAX_CONCURRENT_VAR: &str = "MAX_CONCURRENT_UPSTREAM";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_TOKENS: u32 = 150;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_CONCURRENT: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Process configuration, resolved once at startup.
#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub port: u16,
    pub max_tokens: u32,
    pub temperature: f32,
    pub upstream_timeout: Duration,
    pub max_concurrent_upstream: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            port: DEFAULT_PORT,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            upstream_timeout: DEFAULT_TIMEOUT,
            max_concurrent_upstream: DEFAULT_MAX_CONCURRENT,
        }
    }
}

// Never print the key itself.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("port", &self.port)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("max_concurrent_upstream", &self.max_concurrent_upstream)
            .finish()
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset. Unparseable or out-of-range values
    /// are rejected with the offending variable named in the error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let temperature = parse_or(get(TEMPERATURE_VAR), TEMPERATURE_VAR, defaults.temperature)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(invalid(TEMPERATURE_VAR, temperature, "must be between 0.0 and 2.0"));
        }

        let timeout_secs: u64 = parse_or(get(TIMEOUT_VAR), TIMEOUT_VAR, DEFAULT_TIMEOUT.as_secs())?;
        if timeout_secs == 0 {
            return Err(invalid(TIMEOUT_VAR, timeout_secs, "must be greater than zero"));
        }

        let max_concurrent_upstream =
            parse_or(get(MAX_CONCURRENT_VAR), MAX_CONCURRENT_VAR, defaults.max_concurrent_upstream)?;
        if max_concurrent_upstream == 0 {
            return Err(invalid(MAX_CONCURRENT_VAR, max_concurrent_upstream, "must be greater than zero"));
        }

        Ok(Self {
            api_key: get(API_KEY_VAR),
            base_url: get(BASE_URL_VAR).unwrap_or(defaults.base_url),
            model: get(MODEL_VAR).unwrap_or(defaults.model),
            port: parse_or(get(PORT_VAR), PORT_VAR, defaults.port)?,
            max_tokens: parse_or(get(MAX_TOKENS_VAR), MAX_TOKENS_VAR, defaults.max_tokens)?,
            temperature,
            upstream_timeout: Duration::from_secs(timeout_secs),
            max_concurrent_upstream,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn api_key_format_valid(&self) -> bool {
        self.api_key.as_deref().is_some_and(looks_like_api_key)
    }
}

/// Loose shape check for OpenAI-style secret keys.
pub fn looks_like_api_key(key: &str) -> bool {
    key.starts_with("sk-") && key.len() >= 20 && !key.chars().any(char::is_whitespace)
}

fn parse_or<T>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

fn invalid(var: &'static str, value: impl fmt::Display, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert!(!config.is_configured());
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_tokens, 150);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.upstream_timeout, Duration::from_secs(30));
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-abcdefghijklmnopqrstuvwxyz"),
            ("PORT", "8080"),
            ("CHAT_MAX_TOKENS", "300"),
            ("CHAT_TEMPERATURE", "1.2"),
            ("UPSTREAM_TIMEOUT_SECS", "5"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
        ]))
        .unwrap();
        assert!(config.is_configured());
        assert!(config.api_key_format_valid());
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_tokens, 300);
        assert_eq!(config.temperature, 1.2);
        assert_eq!(config.upstream_timeout, Duration::from_secs(5));
        assert_eq!(config.model, "gpt-4o-mini");
    }

    #[test]
    fn blank_key_counts_as_unset() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "   ")])).unwrap();
        assert!(!config.is_configured());
        assert!(!config.api_key_format_valid());
    }

    #[test]
    fn bad_port_names_the_variable() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Config::from_lookup(lookup(&[("CHAT_TEMPERATURE", "3.5")])).is_err());
        assert!(Config::from_lookup(lookup(&[("UPSTREAM_TIMEOUT_SECS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("MAX_CONCURRENT_UPSTREAM", "0")])).is_err());
    }

    #[test]
    fn key_shape_check() {
        assert!(looks_like_api_key("sk-proj-0123456789abcdef"));
        assert!(!looks_like_api_key("sk-short"));
        assert!(!looks_like_api_key("pk-0123456789abcdefghij"));
        assert!(!looks_like_api_key("sk-0123456789 abcdefghij"));
    }

    #[test]
    fn debug_output_hides_the_key() {
        let config = Config {
            api_key: Some("sk-secret-value-1234567890".to_string()),
            ..Config::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-secret-value"));
        assert!(printed.contains("<redacted>"));
    }
}
