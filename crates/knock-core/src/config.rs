//! Configuration system for knock.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $KNOCK_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/knock/config.toml
//!   3. ~/.config/knock/config.toml

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::cookie::DEFAULT_COOKIE_PREFIX;
use crate::secret::{validate_hash, VerifyError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnockConfig {
    pub gate: GateConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Argon2 PHC hash of the shared secret. Required.
    pub key_hash: String,
    /// Fixed part of the session cookie name; a random suffix is appended at startup.
    pub cookie_prefix: String,
    /// Sessions idle longer than this are evicted.
    pub session_idle_secs: u64,
    /// How often the sweeper runs.
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the gate listens on.
    pub listen: String,
    /// Directory served behind the gate.
    pub root: PathBuf,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            key_hash: String::new(),
            cookie_prefix: DEFAULT_COOKIE_PREFIX.to_string(),
            session_idle_secs: 15 * 60,
            sweep_interval_secs: 60,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
            root: data_dir().join("www"),
        }
    }
}

impl GateConfig {
    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("knock")
}

pub fn data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".local").join("share"))
        .join("knock")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
    #[error("gate.key_hash is not set")]
    MissingKeyHash,
    #[error("gate.key_hash is invalid: {0}")]
    InvalidKeyHash(VerifyError),
    #[error("server.listen {0:?} is not a socket address")]
    InvalidListen(String),
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("{var}={value:?} is not a whole number of seconds")]
    InvalidEnv { var: &'static str, value: String },
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl KnockConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::file_path())
    }

    /// Load from an explicit path, falling back to defaults if it does not exist.
    pub fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            KnockConfig::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("KNOCK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&KnockConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Check everything the daemon needs before it starts serving.
    pub fn validate(&self) -> Result<SocketAddr, ConfigError> {
        if self.gate.key_hash.is_empty() {
            return Err(ConfigError::MissingKeyHash);
        }
        validate_hash(&self.gate.key_hash).map_err(ConfigError::InvalidKeyHash)?;
        if self.gate.session_idle_secs == 0 {
            return Err(ConfigError::ZeroDuration("gate.session_idle_secs"));
        }
        if self.gate.sweep_interval_secs == 0 {
            return Err(ConfigError::ZeroDuration("gate.sweep_interval_secs"));
        }
        self.server
            .listen
            .parse()
            .map_err(|_| ConfigError::InvalidListen(self.server.listen.clone()))
    }

    /// Apply KNOCK_* env var overrides.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(v) = std::env::var("KNOCK_GATE__KEY_HASH") {
            self.gate.key_hash = v;
        }
        if let Ok(v) = std::env::var("KNOCK_GATE__SESSION_IDLE_SECS") {
            self.gate.session_idle_secs = parse_secs("KNOCK_GATE__SESSION_IDLE_SECS", &v)?;
        }
        if let Ok(v) = std::env::var("KNOCK_SERVER__LISTEN") {
            self.server.listen = v;
        }
        if let Ok(v) = std::env::var("KNOCK_SERVER__ROOT") {
            self.server.root = PathBuf::from(v);
        }
        Ok(())
    }
}

fn parse_secs(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
    })
}
