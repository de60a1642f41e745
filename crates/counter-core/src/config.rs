//! Configuration loading and typed config structures for the counter service.
//!
//! The configuration lives in `counter-config.yaml` next to the binary's
//! working directory. Every field has a default, so an empty or missing
//! file yields a working service on `0.0.0.0:8080` ticking once per
//! second.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// Counter engine settings.
    #[serde(default)]
    pub counter: CounterConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `COUNTER_HOST` overrides `server.host`
    /// - `COUNTER_PORT` overrides `server.port`
    /// - `COUNTER_TICK_INTERVAL_MS` overrides `counter.tick_interval_ms`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, applying environment
    /// overrides and validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml rejects a fully empty document; treat it as all-defaults.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override selected values with process environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Override selected values using an arbitrary variable lookup.
    ///
    /// Numeric values that fail to parse are logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("COUNTER_HOST") {
            self.server.host = host;
        }
        if let Some(raw) = lookup("COUNTER_PORT") {
            match raw.parse() {
                Ok(port) => self.server.port = port,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid COUNTER_PORT"),
            }
        }
        if let Some(raw) = lookup("COUNTER_TICK_INTERVAL_MS") {
            match raw.parse() {
                Ok(ms) => self.counter.tick_interval_ms = ms,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid COUNTER_TICK_INTERVAL_MS"),
            }
        }
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `counter.tick_interval_ms` is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.counter.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "counter.tick_interval_ms must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// Counter engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CounterConfig {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Counter value at process start.
    #[serde(default)]
    pub initial_value: i64,

    /// Whether automatic increment is enabled at process start.
    #[serde(default = "default_true")]
    pub start_running: bool,
}

impl CounterConfig {
    /// The tick period as a [`Duration`](std::time::Duration).
    pub const fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            initial_value: 0,
            start_running: true,
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_true() -> bool {
    true
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ServiceConfig::default();
        assert_eq!(config.counter.tick_interval_ms, 1000);
        assert_eq!(config.counter.initial_value, 0);
        assert!(config.counter.start_running);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
counter:
  tick_interval_ms: 250
  initial_value: -5
  start_running: false

server:
  host: "127.0.0.1"
  port: 9090

logging:
  level: "debug"
  json: true
"#;
        let mut config: ServiceConfig = serde_yml::from_str(yaml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.counter.tick_interval_ms, 250);
        assert_eq!(config.counter.initial_value, -5);
        assert!(!config.counter.start_running);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);

        config.apply_overrides_from(|_| None);
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: ServiceConfig = serde_yml::from_str("server:\n  port: 3000\n").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.counter, CounterConfig::default());
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = ServiceConfig::parse("   \n").unwrap();
        assert_eq!(config.counter.initial_value, 0);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let config: ServiceConfig =
            serde_yml::from_str("counter:\n  tick_interval_ms: 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let err = ServiceConfig::parse("counter: [unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn env_overrides_apply() {
        let vars: BTreeMap<&str, &str> = [
            ("COUNTER_HOST", "127.0.0.1"),
            ("COUNTER_PORT", "5001"),
            ("COUNTER_TICK_INTERVAL_MS", "200"),
        ]
        .into_iter()
        .collect();

        let mut config = ServiceConfig::default();
        config.apply_overrides_from(|key| vars.get(key).map(|v| (*v).to_owned()));

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.counter.tick_interval_ms, 200);
    }

    #[test]
    fn invalid_numeric_overrides_are_ignored() {
        let mut config = ServiceConfig::default();
        config.apply_overrides_from(|key| match key {
            "COUNTER_PORT" => Some(String::from("not-a-port")),
            "COUNTER_TICK_INTERVAL_MS" => Some(String::from("-1")),
            _ => None,
        });

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.counter.tick_interval_ms, 1000);
    }

    #[test]
    fn tick_interval_converts_to_duration() {
        let config = CounterConfig {
            tick_interval_ms: 1500,
            ..CounterConfig::default()
        };
        assert_eq!(config.tick_interval(), std::time::Duration::from_millis(1500));
    }
}
