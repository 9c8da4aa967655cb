//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::categorize::cache::DEFAULT_CACHE_CAPACITY;
use crate::crm::{DEFAULT_CRM_BASE_URL, OwnerKeys};
use crate::error::ConfigError;

/// Default categorization model.
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";

/// Default listen port (the Azure Functions local host port).
pub const DEFAULT_PORT: u16 = 7071;

/// Rate limiter settings: `requests` per `per`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests: u32,
    pub per: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests: 30,
            per: Duration::from_secs(60), // 30 requests per minute
        }
    }
}

/// Service configuration, built from environment variables.
#[derive(Debug)]
pub struct ServiceConfig {
    pub anthropic_api_key: SecretString,
    pub model: String,
    pub port: u16,
    pub owner_keys: OwnerKeys,
    pub crm_base_url: String,
    pub rate_limit: RateLimitConfig,
    pub cache_capacity: usize,
}

impl ServiceConfig {
    /// Build config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let anthropic_api_key = var("ANTHROPIC_API_KEY")
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("ANTHROPIC_API_KEY".to_string()))?;

        let model = var("CATEGORIZER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let port = parse_or("CATEGORIZER_PORT", var("CATEGORIZER_PORT"), DEFAULT_PORT)?;

        let owner_keys = match var("BONZO_API_KEYS") {
            Some(raw) => OwnerKeys::from_json(&raw)?,
            None => OwnerKeys::default(),
        };

        let crm_base_url =
            var("BONZO_API_BASE_URL").unwrap_or_else(|| DEFAULT_CRM_BASE_URL.to_string());

        let defaults = RateLimitConfig::default();
        let requests = parse_or("RATE_LIMIT_REQUESTS", var("RATE_LIMIT_REQUESTS"), defaults.requests)?;
        if requests == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RATE_LIMIT_REQUESTS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        let per_secs = parse_or(
            "RATE_LIMIT_PER_SECS",
            var("RATE_LIMIT_PER_SECS"),
            defaults.per.as_secs_f64(),
        )?;
        let per = Duration::try_from_secs_f64(per_secs)
            .ok()
            .filter(|per| !per.is_zero())
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "RATE_LIMIT_PER_SECS".to_string(),
                message: format!("{per_secs}: must be a positive number of seconds"),
            })?;

        let cache_capacity = parse_or(
            "CATEGORY_CACHE_SIZE",
            var("CATEGORY_CACHE_SIZE"),
            DEFAULT_CACHE_CAPACITY,
        )?;

        Ok(Self {
            anthropic_api_key,
            model,
            port,
            owner_keys,
            crm_base_url,
            rate_limit: RateLimitConfig { requests, per },
            cache_capacity,
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{raw:?}: {e}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_with_only_api_key() {
        let config = config_from(&[("ANTHROPIC_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.anthropic_api_key.expose_secret(), "sk-test");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.owner_keys.is_empty());
        assert_eq!(config.crm_base_url, DEFAULT_CRM_BASE_URL);
        assert_eq!(config.rate_limit, RateLimitConfig::default());
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn missing_api_key_is_error() {
        let err = config_from(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "ANTHROPIC_API_KEY"));

        let err = config_from(&[("ANTHROPIC_API_KEY", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("CATEGORIZER_MODEL", "claude-sonnet-4-20250514"),
            ("CATEGORIZER_PORT", "8080"),
            ("BONZO_API_KEYS", r#"{"owner1": "k1"}"#),
            ("BONZO_API_BASE_URL", "http://localhost:9000"),
            ("RATE_LIMIT_REQUESTS", "10"),
            ("RATE_LIMIT_PER_SECS", "2.5"),
            ("CATEGORY_CACHE_SIZE", "0"),
        ])
        .unwrap();

        assert_eq!(config.model, "claude-sonnet-4-20250514");
        assert_eq!(config.port, 8080);
        assert!(config.owner_keys.get("owner1").is_some());
        assert_eq!(config.crm_base_url, "http://localhost:9000");
        assert_eq!(config.rate_limit.requests, 10);
        assert_eq!(config.rate_limit.per, Duration::from_millis(2500));
        assert_eq!(config.cache_capacity, 0);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = config_from(&[("ANTHROPIC_API_KEY", "k"), ("CATEGORIZER_PORT", "http")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "CATEGORIZER_PORT"));

        let err = config_from(&[("ANTHROPIC_API_KEY", "k"), ("RATE_LIMIT_REQUESTS", "0")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "RATE_LIMIT_REQUESTS"));

        let err = config_from(&[("ANTHROPIC_API_KEY", "k"), ("RATE_LIMIT_PER_SECS", "-1")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "RATE_LIMIT_PER_SECS"));

        for per in ["0", "1e20", "NaN", "inf"] {
            let err = config_from(&[("ANTHROPIC_API_KEY", "k"), ("RATE_LIMIT_PER_SECS", per)])
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "RATE_LIMIT_PER_SECS"),
                "RATE_LIMIT_PER_SECS={per} should be rejected"
            );
        }
    }

    #[test]
    fn invalid_owner_keys_json_is_rejected() {
        let err = config_from(&[("ANTHROPIC_API_KEY", "k"), ("BONZO_API_KEYS", "not json")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "BONZO_API_KEYS"));
    }
}
