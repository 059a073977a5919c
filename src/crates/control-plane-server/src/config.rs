//! Server configuration: HTTP bind address, database connection string,
//! and execution defaults, loaded from an optional TOML file with
//! environment overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0:?}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig { host: "127.0.0.1".to_string(), port: 8080 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// An sqlx SQLite connection string, e.g. `sqlite://control-plane.db` or
    /// `sqlite::memory:`.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig { url: "sqlite://control-plane.db?mode=rwc".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Spec §4.1 `options.maxExecutionTime` default (5 minutes).
    pub max_execution_time_secs: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig { max_execution_time_secs: 5 * 60 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

impl ServerConfig {
    /// Loads from `$CONFIG_PATH`, then `config/control-plane.toml`, then
    /// `./control-plane.toml`; falls back to defaults (with `HOST`/`PORT`
    /// environment overrides) if none exist. This binary has no packaging
    /// story (spec §1 Non-goals), so an absent config file is not fatal the
    /// way it is for a packaged deployment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var("CONFIG_PATH") {
            return Self::from_file(path);
        }

        for candidate in ["config/control-plane.toml", "./control-plane.toml"] {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::from_file(path);
            }
        }

        let mut config = ServerConfig::default();
        if let Ok(host) = std::env::var("HOST") {
            config.http.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                config.http.port = port;
            }
        }
        Ok(config)
    }

    fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn max_execution_time(&self) -> Duration {
        Duration::from_secs(self.execution.max_execution_time_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ServerConfig::default();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.max_execution_time(), Duration::from_secs(300));
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config: ServerConfig = toml::from_str("[http]\nport = 9000\n").unwrap();
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.host, "127.0.0.1");
    }
}
