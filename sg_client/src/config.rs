//! Client configuration management.
//!
//! Reads `SG_*` environment variables, applies command-line overrides, and
//! validates the result.

use shoot_gate::{DEFAULT_ANTE, DEFAULT_PORT, Usd};
use std::{str::FromStr, time::Duration};

use super::connection::DEFAULT_RECONNECT_DELAY;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_SCHEME: &str = "ws";

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Server host name or address
    pub host: String,
    /// Server port
    pub port: u16,
    /// `ws` or `wss`
    pub scheme: String,
    /// Display name offered when joining
    pub name: String,
    /// Ante offered when joining
    pub ante: Usd,
    /// Pause between connection attempts
    pub reconnect_delay: Duration,
}

/// Values given on the command line. These win over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub scheme: Option<String>,
    pub name: Option<String>,
    pub ante: Option<Usd>,
    pub reconnect_delay_ms: Option<u64>,
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a loaded value fails validation.
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::from_vars(overrides, |key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a loaded value fails validation.
    pub fn from_vars<F>(overrides: ConfigOverrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = overrides
            .host
            .or_else(|| lookup("SG_HOST"))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let scheme = overrides
            .scheme
            .or_else(|| lookup("SG_SCHEME"))
            .unwrap_or_else(|| DEFAULT_SCHEME.to_string())
            .to_lowercase();
        let name = overrides
            .name
            .or_else(|| lookup("SG_NAME"))
            .unwrap_or_else(whoami::username);

        let reconnect_delay_ms = overrides.reconnect_delay_ms.unwrap_or_else(|| {
            parse_env_or(
                &lookup,
                "SG_RECONNECT_DELAY_MS",
                DEFAULT_RECONNECT_DELAY.as_millis() as u64,
            )
        });

        let config = ClientConfig {
            host: host.trim().to_string(),
            port: overrides
                .port
                .unwrap_or_else(|| parse_env_or(&lookup, "SG_PORT", DEFAULT_PORT)),
            scheme,
            name: name.trim().to_string(),
            ante: overrides
                .ante
                .unwrap_or_else(|| parse_env_or(&lookup, "SG_ANTE", DEFAULT_ANTE)),
            reconnect_delay: Duration::from_millis(reconnect_delay_ms),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Invalid {
                var: "SG_HOST".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.port == 0 {
            return Err(ConfigError::Invalid {
                var: "SG_PORT".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if !matches!(self.scheme.as_str(), "ws" | "wss") {
            return Err(ConfigError::Invalid {
                var: "SG_SCHEME".to_string(),
                reason: format!("Must be ws or wss, got {:?}", self.scheme),
            });
        }

        if self.ante == 0 {
            return Err(ConfigError::Invalid {
                var: "SG_ANTE".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// The WebSocket endpoint, e.g. `ws://localhost:8765`.
    pub fn ws_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse a variable, falling back to `default` when absent or unparsable.
fn parse_env_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)], overrides: ConfigOverrides) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_vars(overrides, |key| vars.get(key).cloned())
    }

    fn named() -> ConfigOverrides {
        ConfigOverrides {
            name: Some("tester".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = load(&[], named()).unwrap();
        assert_eq!(config.ws_url(), "ws://localhost:8765");
        assert_eq!(config.ante, DEFAULT_ANTE);
        assert_eq!(config.reconnect_delay, Duration::from_secs(3));
        assert_eq!(config.name, "tester");
    }

    #[test]
    fn test_env_values() {
        let config = load(
            &[
                ("SG_HOST", "cards.example.com"),
                ("SG_PORT", "9000"),
                ("SG_SCHEME", "WSS"),
                ("SG_NAME", " Alice "),
                ("SG_ANTE", "25"),
                ("SG_RECONNECT_DELAY_MS", "500"),
            ],
            ConfigOverrides::default(),
        )
        .unwrap();
        assert_eq!(config.ws_url(), "wss://cards.example.com:9000");
        assert_eq!(config.name, "Alice");
        assert_eq!(config.ante, 25);
        assert_eq!(config.reconnect_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_overrides_win() {
        let overrides = ConfigOverrides {
            host: Some("127.0.0.1".to_string()),
            port: Some(4000),
            ..named()
        };
        let config = load(&[("SG_HOST", "elsewhere"), ("SG_PORT", "1")], overrides).unwrap();
        assert_eq!(config.ws_url(), "ws://127.0.0.1:4000");
    }

    #[test]
    fn test_unparsable_value_falls_back() {
        let config = load(&[("SG_PORT", "not-a-port")], named()).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_rejects_zero_port() {
        let err = load(&[("SG_PORT", "0")], named()).unwrap_err();
        assert!(err.to_string().contains("SG_PORT"));
    }

    #[test]
    fn test_rejects_zero_ante() {
        let err = load(&[("SG_ANTE", "0")], named()).unwrap_err();
        assert!(err.to_string().contains("SG_ANTE"));
    }

    #[test]
    fn test_rejects_unknown_scheme() {
        let err = load(&[("SG_SCHEME", "http")], named()).unwrap_err();
        assert!(err.to_string().contains("SG_SCHEME"));
    }

    #[test]
    fn test_rejects_blank_host() {
        let err = load(&[("SG_HOST", "   ")], named()).unwrap_err();
        assert!(err.to_string().contains("SG_HOST"));
    }
}
