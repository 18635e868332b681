//! roonpipe-core - Search-and-play client for the RoonPipe daemon
//!
//! This crate provides everything between a launcher and the daemon socket:
//! - Per-request Unix socket transport with a fixed time bound
//! - Debounced query sessions that drop stale searches
//! - Mapping of search responses to display entries and play actions
//! - Configuration management

pub mod client;
pub mod config;
pub mod error;
pub mod presenter;
pub mod session;

pub use client::{Daemon, DaemonClient};
pub use config::{ActionModel, Config};
pub use error::{Result, RoonpipeError};
pub use presenter::{DisplayEntry, EntryAction, EntryKind, IconSource, Presenter};
pub use session::{QueryHandler, QuerySession, ResultSink, SearchController, SessionState};

pub use roonpipe_protocol as protocol;

use std::path::Path;
use std::sync::Arc;

use roonpipe_protocol::{PlayRequest, Request};

/// Display name of the handler
pub const NAME: &str = "RoonPipe";

/// One-line description of the handler
pub const DESCRIPTION: &str = "Search and play Roon tracks via RoonPipe";

/// Prefix hosts route to this handler unless configured otherwise
pub const DEFAULT_TRIGGER: &str = "roon ";

/// Shown while the query after the trigger is still empty
pub const SYNOPSIS: &str = "Search for tracks...";

/// High-level entry point: a configured client plus its presenter
pub struct RoonPipe {
    config: Config,
    client: Arc<DaemonClient>,
    presenter: Arc<Presenter>,
}

impl RoonPipe {
    /// Create a client from a specific config file
    pub fn open_with_file(path: &Path) -> Result<Self> {
        let config = Config::load_from(path)?;
        Ok(Self::new(config))
    }

    pub fn new(config: Config) -> Self {
        let client = Arc::new(DaemonClient::from_config(&config.daemon));
        let daemon: Arc<dyn Daemon> = client.clone();
        let presenter = Arc::new(Presenter::new(daemon, &config.presenter));

        Self {
            config,
            client,
            presenter,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &DaemonClient {
        &self.client
    }

    /// Whether the daemon socket exists
    pub fn is_running(&self) -> bool {
        self.client.is_available()
    }

    /// Search right away, without debouncing.
    ///
    /// Blank text yields no entries. A missing daemon yields the single
    /// "not running" advisory without connecting.
    pub async fn search(&self, text: &str) -> Vec<DisplayEntry> {
        let query = text.trim();
        if query.is_empty() {
            return vec![];
        }
        if !self.client.is_available() {
            return vec![self.presenter.daemon_absent()];
        }

        let response = self.client.send(Request::search(query)).await;
        self.presenter.present(query, response)
    }

    /// Send a play request; `true` only if the daemon reports success
    pub async fn play(&self, request: PlayRequest) -> bool {
        self.client.send(Request::Play(request)).await.is_success()
    }

    /// Build a debouncing controller that spawns its sessions on `runtime`
    pub fn controller(&self, runtime: tokio::runtime::Handle) -> SearchController {
        let daemon: Arc<dyn Daemon> = self.client.clone();
        SearchController::new(
            daemon,
            self.presenter.clone(),
            self.config.search.debounce(),
            self.config.search.trigger.clone(),
            runtime,
        )
    }
}
