//! Configuration management for Tollgate.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Main configuration for the Tollgate service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TollgateConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Decision service client configuration
    #[serde(default)]
    pub decision_service: DecisionServiceConfig,
}

impl Default for TollgateConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            decision_service: DecisionServiceConfig::default(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
        }
    }
}

fn default_http_addr() -> SocketAddr {
    "127.0.0.1:8080".parse().unwrap()
}

/// Rate limit decision service client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionServiceConfig {
    /// Endpoint URI of the decision service
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in milliseconds.
    ///
    /// When unset, no client-side deadline is applied and calls run as
    /// long as the underlying transport allows.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    /// Connect timeout in milliseconds
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
}

impl Default for DecisionServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_ms: None,
            connect_timeout_ms: None,
        }
    }
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8081".to_string()
}

impl TollgateConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: &str) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: TollgateConfig = serde_yaml::from_str(&contents)
            .map_err(|e| crate::error::TollgateError::Config(e.to_string()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TollgateConfig::default();

        assert_eq!(config.server.http_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.decision_service.endpoint, "http://127.0.0.1:8081");
        assert_eq!(config.decision_service.request_timeout_ms, None);
    }

    #[test]
    fn test_partial_yaml_applies_defaults() {
        let yaml = r#"
decision_service:
  endpoint: "http://ratelimit.internal:8081"
  request_timeout_ms: 250
"#;

        let config: TollgateConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(
            config.decision_service.endpoint,
            "http://ratelimit.internal:8081"
        );
        assert_eq!(config.decision_service.request_timeout_ms, Some(250));
        // Untouched sections keep their defaults
        assert_eq!(config.server.http_addr, "127.0.0.1:8080".parse().unwrap());
    }
}
