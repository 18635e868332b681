use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the daemon socket path
pub const SOCKET_ENV: &str = "ROONPIPE_SOCKET";

/// Global client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Daemon connection
    pub daemon: DaemonConfig,

    /// Query debouncing and routing
    pub search: SearchConfig,

    /// Result presentation
    pub presenter: PresenterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Socket the RoonPipe daemon listens on
    pub socket_path: PathBuf,

    /// Upper bound on a whole request/response round trip (milliseconds)
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before searching (milliseconds)
    pub debounce_ms: u64,

    /// Prefix a launcher uses to route queries to this handler
    pub trigger: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterConfig {
    /// Which play request shape result actions send
    pub action_model: ActionModel,

    /// Icon shown when a result has no cover art on disk
    pub fallback_icon: PathBuf,
}

/// How per-result actions are built.
///
/// `Declared` uses the actions the daemon lists for each result and sends the
/// chosen title back; `Fixed` offers the four built-in play actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionModel {
    #[default]
    Declared,
    Fixed,
}

impl std::str::FromStr for ActionModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "declared" => Ok(ActionModel::Declared),
            "fixed" => Ok(ActionModel::Fixed),
            other => Err(format!("unknown action model '{}' (expected declared or fixed)", other)),
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from("/tmp/roonpipe.sock"),
            timeout_ms: 5_000,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            trigger: crate::DEFAULT_TRIGGER.to_string(),
        }
    }
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            action_model: ActionModel::default(),
            fallback_icon: default_data_dir().join("icons").join("roon.png"),
        }
    }
}

impl DaemonConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("roonpipe-search")
}

impl Config {
    /// Load config from default locations (in order of precedence):
    /// 1. $PWD/.roonpipe-search.toml
    /// 2. $XDG_CONFIG_HOME/roonpipe-search/config.toml
    /// 3. Built-in defaults
    ///
    /// `ROONPIPE_SOCKET` is applied on top of whichever one wins.
    pub fn load() -> Self {
        Self::load_file()
            .unwrap_or_default()
            .with_overrides(|key| std::env::var(key).ok())
    }

    fn load_file() -> Option<Self> {
        let mut candidates = vec![PathBuf::from(".roonpipe-search.toml")];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("roonpipe-search").join("config.toml"));
        }

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(config) => {
                    tracing::debug!("Loaded config from {}", path.display());
                    return Some(config);
                }
                Err(e) => {
                    tracing::warn!("Ignoring config {}: {}", path.display(), e);
                }
            }
        }

        None
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment overrides, looked up through `lookup`
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(socket) = lookup(SOCKET_ENV).filter(|s| !s.is_empty()) {
            self.daemon.socket_path = PathBuf::from(socket);
        }
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
