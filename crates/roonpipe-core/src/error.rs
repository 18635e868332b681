use std::path::PathBuf;
use std::time::Duration;

use roonpipe_protocol::{ErrorTag, ProtocolError};
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum RoonpipeError {
    #[error("Daemon connection failed: {0}")]
    DaemonConnection(#[source] std::io::Error),

    #[error("Daemon not running: no socket at {0}")]
    DaemonNotRunning(PathBuf),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl RoonpipeError {
    /// Wire tag reported in place of this error when a round trip fails
    pub fn tag(&self) -> ErrorTag {
        match self {
            RoonpipeError::Timeout(_) => ErrorTag::Timeout,
            RoonpipeError::DaemonConnection(_) | RoonpipeError::DaemonNotRunning(_) => {
                ErrorTag::Connection
            }
            RoonpipeError::Protocol(_) => ErrorTag::Parse,
            RoonpipeError::Config(e) => ErrorTag::Daemon(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RoonpipeError>;
