use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Matching engine YAML; built-in defaults when unset
    #[serde(default)]
    pub engine_config_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            engine_config_path: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `server.*` file and
    /// `LOSTFOUND_SERVER__*` environment variables, in increasing priority.
    pub fn load() -> anyhow::Result<Self> {
        // A missing .env is normal outside development
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with environment variables
            .add_source(config::Environment::with_prefix("LOSTFOUND_SERVER").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    2
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.max_body_size(), 2 * 1024 * 1024);
        assert!(cfg.enable_cors);
        assert!(cfg.metrics_enabled);
        assert!(cfg.engine_config_path.is_none());
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_invalid_bind_addr() {
        let cfg = ServerConfig {
            bind_addr: "not an address".into(),
            ..ServerConfig::default()
        };
        assert!(cfg.socket_addr().is_err());
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let cfg: ServerConfig =
            serde_json::from_str(r#"{"port": 9090, "engine_config_path": "engine.yaml"}"#).unwrap();
        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.engine_config_path, Some(PathBuf::from("engine.yaml")));
    }
}
