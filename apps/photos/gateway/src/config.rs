use std::env;
use std::net::Ipv4Addr;

use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Application environment
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env_or_default("APP_ENV", "development");

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// One HTTP listener address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListenerConfig {
    pub host: String,
    pub port: u16,
}

impl ListenerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Reads `{prefix}_HOST` and `{prefix}_PORT`, falling back to all interfaces and `default_port`.
    pub fn from_env(prefix: &str, default_port: u16) -> Result<Self, ConfigError> {
        let host_key = format!("{}_HOST", prefix);
        let port_key = format!("{}_PORT", prefix);

        let host = env_or_default(&host_key, &Ipv4Addr::UNSPECIFIED.to_string());
        let port = match env::var(&port_key) {
            Ok(raw) => raw.parse().map_err(|e| ConfigError::ParseError {
                key: port_key,
                details: format!("{}", e),
            })?,
            Err(_) => default_port,
        };

        Ok(Self { host, port })
    }

    /// Get the listener address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Process-level settings. Store and embedding settings are loaded by their own clients.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub environment: Environment,
    /// Client-facing API.
    pub public: ListenerConfig,
    /// Indexer API and health probes.
    pub internal: ListenerConfig,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            environment: Environment::from_env(),
            public: ListenerConfig::from_env("PUBLIC", 8080)?,
            internal: ListenerConfig::from_env("INTERNAL", 8081)?,
        })
    }
}

/// Helper to load an environment variable with a default value
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
