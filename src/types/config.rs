//! Configuration structures.
//!
//! Configuration is read through a [`ConfigSource`] (the process environment in
//! production, a plain map in tests) and never looked up ambiently afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Environment key: REST base URL.
pub const JIRA_URL: &str = "JIRA_URL";
/// Environment key: REST username.
pub const JIRA_USERNAME: &str = "JIRA_USERNAME";
/// Environment key: REST API token.
pub const JIRA_API_TOKEN: &str = "JIRA_API_TOKEN";
/// Environment key: organization id.
pub const ORG_ID: &str = "ORG_ID";
/// Environment key: organization admin bearer token.
pub const ADMIN_API_KEY: &str = "ADMIN_API_KEY";
/// Environment key: Org Admin API base URL override.
pub const ORG_ADMIN_URL: &str = "ORG_ADMIN_URL";
/// Environment key: health endpoint port.
pub const MCP_PORT: &str = "MCP_PORT";
/// Environment key: per-request backend timeout (humantime).
pub const HTTP_TIMEOUT: &str = "JIRA_ADMIN_HTTP_TIMEOUT";
/// Environment key: per-probe timeout (humantime).
pub const PROBE_TIMEOUT: &str = "JIRA_ADMIN_PROBE_TIMEOUT";
/// Environment key: log format (`json` or anything else for compact).
pub const LOG_FORMAT: &str = "JIRA_ADMIN_LOG_FORMAT";

/// Keys the environment probe requires to be present and non-empty.
pub const REQUIRED_KEYS: [&str; 5] = [JIRA_URL, JIRA_USERNAME, JIRA_API_TOKEN, ORG_ID, ADMIN_API_KEY];

/// Read-only key/value configuration lookup.
pub trait ConfigSource: Send + Sync {
    /// Raw value for `key`, if set.
    fn get_raw(&self, key: &str) -> Option<String>;

    /// Trimmed value for `key`; empty values count as absent.
    fn get(&self, key: &str) -> Option<String> {
        self.get_raw(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get_raw(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Global process configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Backend HTTP configuration.
    #[serde(default)]
    pub http: HttpConfig,

    /// Stdio tool protocol configuration.
    #[serde(default)]
    pub mcp: McpConfig,
}

impl Config {
    /// Build from a configuration source, falling back to defaults for
    /// anything absent or unparseable.
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        let mut config = Config::default();

        if let Some(port) = source.get(MCP_PORT) {
            match port.parse::<u16>() {
                Ok(port) => config.server.health_addr = format!("0.0.0.0:{port}"),
                Err(_) => tracing::warn!(key = MCP_PORT, value = %port, "ignoring invalid port"),
            }
        }
        if let Some(timeout) = parse_duration(source, HTTP_TIMEOUT) {
            config.http.request_timeout = timeout;
        }
        if let Some(timeout) = parse_duration(source, PROBE_TIMEOUT) {
            config.http.probe_timeout = timeout;
        }
        if let Some(format) = source.get(LOG_FORMAT) {
            config.observability.json_logs = format.eq_ignore_ascii_case("json");
        }

        config
    }
}

fn parse_duration(source: &dyn ConfigSource, key: &str) -> Option<Duration> {
    let raw = source.get(key)?;
    match humantime_serde::re::humantime::parse_duration(&raw) {
        Ok(d) if !d.is_zero() => Some(d),
        _ => {
            tracing::warn!(key, value = %raw, "ignoring invalid duration");
            None
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Health endpoint bind address.
    pub health_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            health_addr: "0.0.0.0:6000".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Backend HTTP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Upper bound on a single backend request/response cycle.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Upper bound on a single health probe.
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(10),
        }
    }
}

/// Stdio tool protocol configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Maximum accepted frame (one JSON line) in bytes.
    pub max_frame_bytes: usize,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: 4 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_blank_values_count_as_absent() {
        let src = source(&[(JIRA_URL, "   "), (JIRA_USERNAME, " admin ")]);
        assert_eq!(src.get_raw(JIRA_URL).as_deref(), Some("   "));
        assert_eq!(ConfigSource::get(&src, JIRA_URL), None);
        assert_eq!(ConfigSource::get(&src, JIRA_USERNAME).as_deref(), Some("admin"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_source(&source(&[]));
        assert_eq!(config.server.health_addr, "0.0.0.0:6000");
        assert_eq!(config.http.request_timeout, Duration::from_secs(30));
        assert_eq!(config.http.probe_timeout, Duration::from_secs(10));
        assert!(!config.observability.json_logs);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_source(&source(&[
            (MCP_PORT, "7100"),
            (HTTP_TIMEOUT, "5s"),
            (PROBE_TIMEOUT, "1500ms"),
            (LOG_FORMAT, "JSON"),
        ]));
        assert_eq!(config.server.health_addr, "0.0.0.0:7100");
        assert_eq!(config.http.request_timeout, Duration::from_secs(5));
        assert_eq!(config.http.probe_timeout, Duration::from_millis(1500));
        assert!(config.observability.json_logs);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_source(&source(&[
            (MCP_PORT, "not-a-port"),
            (HTTP_TIMEOUT, "soon"),
            (PROBE_TIMEOUT, "0s"),
        ]));
        assert_eq!(config.server.health_addr, "0.0.0.0:6000");
        assert_eq!(config.http.request_timeout, Duration::from_secs(30));
        assert_eq!(config.http.probe_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_serde_round_trip_uses_humantime() {
        let value = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(value["http"]["probe_timeout"], "10s");
    }
}
