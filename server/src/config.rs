//! Configuration management for the Raffle Pay server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Gateway credentials have no default and must be set.

use raffle_pay_core::reservation::DEFAULT_AVAILABILITY;
use raffle_pay_gateway::config::DEFAULT_BASE_URL;
use raffle_pay_gateway::{GatewayConfig, Secret};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Longest accepted `REGISTRY_TTL_SECS`: one hundred years.
pub const MAX_REGISTRY_TTL_SECS: i64 = 100 * 365 * 24 * 60 * 60;

/// Errors while loading configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    /// A variable could not be parsed
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Payment gateway configuration
    pub gateway: GatewayConfig,
    /// Booking registry configuration
    pub registry: RegistryConfig,
    /// Ticket reservation configuration
    pub reservation: ReservationConfig,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
    /// Port to bind to (default: 8080)
    pub port: u16,
    /// Log filter used when `RUST_LOG` is not parsed by the subscriber (default: info)
    pub log_level: String,
    /// Origins allowed to call the API from a browser (default: none)
    pub cors_allowed_origins: Vec<String>,
}

/// Booking registry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Entry lifetime in seconds, at most [`MAX_REGISTRY_TTL_SECS`]; `None` keeps
    /// entries for the process lifetime
    pub ttl_secs: Option<i64>,
    /// How often expired entries are purged, in seconds (default: 300)
    pub sweep_interval_secs: u64,
}

/// Ticket reservation configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationConfig {
    /// Probability that a requested ticket is available (default: 0.8)
    pub ticket_availability: f64,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Config::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from `lookup`, which maps a variable name to its value.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Missing`] if `SYPAGO_CLIENT_ID`, `SYPAGO_API_KEY` or
    ///   `SYPAGO_CREDITOR_ACCOUNT` is unset
    /// - [`ConfigError::Invalid`] for values that do not parse or are out of range
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let server = ServerConfig {
            host: env.string_or("HOST", "0.0.0.0"),
            port: env.parsed_or("PORT", 8080)?,
            log_level: env.string_or("RUST_LOG", "info"),
            cors_allowed_origins: env
                .get("CORS_ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        };

        let mut gateway = GatewayConfig::new(
            env.string_or("SYPAGO_BASE_URL", DEFAULT_BASE_URL),
            env.required("SYPAGO_CLIENT_ID")?,
            Secret::new(env.required("SYPAGO_API_KEY")?),
            env.required("SYPAGO_CREDITOR_ACCOUNT")?,
        );
        if let Some(bank_code) = env.get("SYPAGO_CREDITOR_BANK_CODE") {
            gateway.creditor_bank_code = bank_code;
        }
        if let Some(webhook_url) = env.get("SYPAGO_WEBHOOK_URL") {
            gateway.webhook_url = webhook_url;
        }
        if let Some(concept) = env.get("SYPAGO_CONCEPT") {
            gateway.concept = concept;
        }
        gateway.auth_timeout_secs =
            env.positive_or("SYPAGO_AUTH_TIMEOUT_SECS", gateway.auth_timeout_secs)?;
        gateway.mutation_timeout_secs =
            env.positive_or("SYPAGO_MUTATION_TIMEOUT_SECS", gateway.mutation_timeout_secs)?;
        gateway.query_timeout_secs =
            env.positive_or("SYPAGO_QUERY_TIMEOUT_SECS", gateway.query_timeout_secs)?;
        gateway.catalog_timeout_secs =
            env.positive_or("SYPAGO_CATALOG_TIMEOUT_SECS", gateway.catalog_timeout_secs)?;

        let ttl_secs = match env.get("REGISTRY_TTL_SECS") {
            Some(value) => match value.parse::<i64>() {
                Ok(ttl) if (1..=MAX_REGISTRY_TTL_SECS).contains(&ttl) => Some(ttl),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "REGISTRY_TTL_SECS",
                        value,
                        reason: format!(
                            "expected a number of seconds between 1 and {MAX_REGISTRY_TTL_SECS}"
                        ),
                    });
                }
            },
            None => None,
        };
        let registry = RegistryConfig {
            ttl_secs,
            sweep_interval_secs: env.positive_or("REGISTRY_SWEEP_INTERVAL_SECS", 300)?,
        };

        let ticket_availability: f64 = env.parsed_or("TICKET_AVAILABILITY", DEFAULT_AVAILABILITY)?;
        if !(0.0..=1.0).contains(&ticket_availability) {
            return Err(ConfigError::Invalid {
                key: "TICKET_AVAILABILITY",
                value: ticket_availability.to_string(),
                reason: "expected a probability between 0 and 1".to_string(),
            });
        }

        Ok(Self {
            server,
            gateway,
            registry,
            reservation: ReservationConfig {
                ticket_availability,
            },
        })
    }

    /// `host:port` to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn parsed_or<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            }),
            None => Ok(default),
        }
    }

    fn positive_or(&self, key: &'static str, default: u64) -> Result<u64, ConfigError> {
        let value = self.parsed_or(key, default)?;
        if value == 0 {
            return Err(ConfigError::Invalid {
                key,
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("SYPAGO_CLIENT_ID", "client-1"),
        ("SYPAGO_API_KEY", "key"),
        ("SYPAGO_CREDITOR_ACCOUNT", "01050000111122223333"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(&REQUIRED).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(config.server.cors_allowed_origins.is_empty());
        assert_eq!(config.gateway.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.gateway.creditor_bank_code, "0105");
        assert_eq!(config.gateway.mutation_timeout_secs, 30);
        assert_eq!(config.gateway.api_key.expose(), "key");
        assert_eq!(config.registry.ttl_secs, None);
        assert_eq!(config.registry.sweep_interval_secs, 300);
        assert!((config.reservation.ticket_availability - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("PORT", "3000"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("SYPAGO_QUERY_TIMEOUT_SECS", "5"),
            ("SYPAGO_CONCEPT", "Rifa"),
            ("REGISTRY_TTL_SECS", "86400"),
            ("TICKET_AVAILABILITY", "1"),
        ]);

        let config = load(&vars).unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(
            config.server.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.gateway.query_timeout_secs, 5);
        assert_eq!(config.gateway.concept, "Rifa");
        assert_eq!(config.registry.ttl_secs, Some(86400));
        assert!((config.reservation.ticket_availability - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_credentials() {
        let err = load(&REQUIRED[..2]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SYPAGO_CREDITOR_ACCOUNT"));

        let mut vars = REQUIRED.to_vec();
        vars[0] = ("SYPAGO_CLIENT_ID", "   ");
        assert_eq!(
            load(&vars).unwrap_err(),
            ConfigError::Missing("SYPAGO_CLIENT_ID")
        );
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            ("PORT", "eighty"),
            ("SYPAGO_AUTH_TIMEOUT_SECS", "0"),
            ("REGISTRY_TTL_SECS", "-5"),
            ("REGISTRY_TTL_SECS", "10000000000000000"),
            ("REGISTRY_TTL_SECS", "3153600001"),
            ("TICKET_AVAILABILITY", "1.5"),
        ];

        for (key, value) in cases {
            let mut vars = REQUIRED.to_vec();
            vars.push((key, value));
            let err = load(&vars).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: k, .. } if k == key),
                "{key}={value} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_registry_ttl_upper_bound() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("REGISTRY_TTL_SECS", "3153600000"));

        let config = load(&vars).unwrap();
        assert_eq!(config.registry.ttl_secs, Some(MAX_REGISTRY_TTL_SECS));
        assert!(chrono::Duration::try_seconds(MAX_REGISTRY_TTL_SECS).is_some());
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let config = load(&REQUIRED).unwrap();
        assert!(!format!("{config:?}").contains("\"key\""));
    }
}
