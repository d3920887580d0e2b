//! Server configuration.
//!
//! Loaded from an optional TOML file; every key has a default so that the
//! server runs without one.
//!
//! ```toml
//! env = "prod"
//! port = 3000
//! base_path = "/game"
//! log_path = "./log"
//! room_capacity = 2
//! origins = ["localhost", "game.icytown.com"]
//!
//! [games]
//! tic-tac-toe = true
//! ```

use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Prod,
    Test,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Deployment environment; `prod` switches logs to JSON
    pub env: Environment,
    /// Host address to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Prefix of the upgrade route (`{base_path}/{game}`)
    pub base_path: String,
    /// Default log level when `RUST_LOG` is not set
    pub log_level: String,
    /// Directory of the daily log files. Empty logs to stdout only.
    pub log_path: String,
    /// Enable-list of game names
    pub games: BTreeMap<String, bool>,
    /// Hostnames allowed in the `Origin` header. Empty disables the check.
    pub origins: Vec<String>,
    /// Players per room
    pub room_capacity: usize,
    /// Require a successful `auth` message before room operations
    pub require_auth: bool,
    /// Close sessions that stay silent this long. 0 disables.
    pub idle_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            env: Environment::Dev,
            host: "127.0.0.1".to_string(),
            port: 3000,
            base_path: "/game".to_string(),
            log_level: "info".to_string(),
            log_path: "./log".to_string(),
            games: BTreeMap::from([("tic-tac-toe".to_string(), true)]),
            origins: vec![
                "localhost".to_string(),
                "game.icytown.com".to_string(),
                "wstool.js.org".to_string(),
            ],
            room_capacity: 2,
            require_auth: false,
            idle_timeout_secs: 0,
        }
    }
}

impl ServerConfig {
    /// Load the configuration from `path` (defaults when `None`) and validate it.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML; keys that are absent keep their defaults. Does not validate.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must not be 0".to_string()));
        }
        if !self.base_path.is_empty()
            && (!self.base_path.starts_with('/')
                || self.base_path.ends_with('/')
                || self.base_path.contains(['{', '}', '?', '#']))
        {
            return Err(ConfigError::Invalid(format!(
                "base_path '{}' must be empty or an absolute path without a trailing '/'",
                self.base_path
            )));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "log_level '{}' must be one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        if self.room_capacity < 2 {
            return Err(ConfigError::Invalid(format!(
                "room_capacity must be at least 2, got {}",
                self.room_capacity
            )));
        }
        if let Some(name) = self
            .games
            .keys()
            .find(|name| name.is_empty() || name.contains('/'))
        {
            return Err(ConfigError::Invalid(format!("invalid game name '{name}'")));
        }
        Ok(())
    }

    pub fn is_game_enabled(&self, name: &str) -> bool {
        self.games.get(name).copied().unwrap_or(false)
    }

    /// Whether an `Origin` hostname may open a session.
    pub fn is_origin_allowed(&self, hostname: Option<&str>) -> bool {
        if self.origins.is_empty() {
            return true;
        }
        hostname.is_some_and(|host| self.origins.iter().any(|o| o.eq_ignore_ascii_case(host)))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Route of the upgrade endpoint, in axum path syntax
    pub fn upgrade_route(&self) -> String {
        format!("{}/{{game}}", self.base_path)
    }

    pub fn log_dir(&self) -> Option<&Path> {
        let path = self.log_path.trim();
        (!path.is_empty()).then(|| Path::new(path))
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }
}
