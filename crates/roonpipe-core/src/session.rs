//! Query sessions: debounce keystrokes, cancel stale searches
//!
//! Every keystroke event starts a new session and supersedes the previous
//! one. A session waits out the debounce window, searches, and hands its
//! entries to the sink only if no newer keystroke arrived in the meantime:
//!
//! ```text
//! Idle -> Debouncing -> Searching -> Rendered
//!            |              |
//!            v              v
//!        Cancelled      Discarded
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use roonpipe_protocol::Request;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::Daemon;
use crate::presenter::{DisplayEntry, Presenter};

/// Receives the entries of a finished query
pub trait ResultSink: Send + Sync {
    fn publish(&self, entries: Vec<DisplayEntry>);
}

/// Capability a launcher binds to route typed text to this client
pub trait QueryHandler: Send + Sync {
    /// Prefix that selects this handler (e.g. `"roon "`)
    fn trigger(&self) -> &str;

    /// Placeholder shown while the user has typed only the trigger
    fn synopsis(&self) -> &str;

    /// Called on every change of the query text; results go to `sink`
    fn handle_query(&self, text: &str, sink: Arc<dyn ResultSink>);
}

/// Lifecycle state of a query session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Debouncing,
    Searching,
    /// Entries were handed to the sink
    Rendered,
    /// Superseded before the debounce window ran out, nothing was sent
    Cancelled,
    /// Superseded while the search was in flight, its result was dropped
    Discarded,
}

impl SessionState {
    /// Still waiting on the debounce window or the daemon
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Debouncing | SessionState::Searching)
    }
}

/// A single submitted query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySession {
    /// Trimmed query text
    pub text: String,
    /// Generation this session was started under
    pub generation: u64,
}

/// Latest generation and the state of the session started under it
#[derive(Debug)]
struct Current {
    generation: u64,
    state: SessionState,
    /// How the most recently ended session ended
    outcome: Option<SessionState>,
    states: watch::Sender<SessionState>,
}

impl Current {
    fn set(&mut self, state: SessionState) {
        self.state = state;
        self.states.send_replace(state);
    }
}

/// Debounces query text and keeps only the latest search alive
pub struct SearchController {
    daemon: Arc<dyn Daemon>,
    presenter: Arc<Presenter>,
    debounce: Duration,
    trigger: String,
    runtime: Handle,
    /// Sessions compare against this, and publish, under the lock
    current: Arc<Mutex<Current>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SearchController {
    pub fn new(
        daemon: Arc<dyn Daemon>,
        presenter: Arc<Presenter>,
        debounce: Duration,
        trigger: impl Into<String>,
        runtime: Handle,
    ) -> Self {
        Self {
            daemon,
            presenter,
            debounce,
            trigger: trigger.into(),
            runtime,
            current: Arc::new(Mutex::new(Current {
                generation: 0,
                state: SessionState::Idle,
                outcome: None,
                states: watch::channel(SessionState::Idle).0,
            })),
            pending: Mutex::new(None),
        }
    }

    /// Register a keystroke event.
    ///
    /// Supersedes whatever session is pending. Returns the new session, or
    /// `None` when the text is blank and the controller went back to idle.
    ///
    /// The sink is called while the generation lock is held, so it must not
    /// call back into the controller synchronously.
    pub fn submit(&self, text: &str, sink: Arc<dyn ResultSink>) -> Option<QuerySession> {
        let mut pending = self.pending.lock();
        let query = text.trim();

        let generation = self.supersede(if query.is_empty() {
            SessionState::Idle
        } else {
            SessionState::Debouncing
        });

        if let Some(previous) = pending.take() {
            previous.abort();
        }

        if query.is_empty() {
            tracing::trace!("generation {}: blank query, idle", generation);
            return None;
        }

        let session = QuerySession {
            text: query.to_string(),
            generation,
        };
        tracing::trace!("generation {}: debouncing {:?}", generation, session.text);

        let task = SessionTask {
            session: session.clone(),
            daemon: self.daemon.clone(),
            presenter: self.presenter.clone(),
            current: self.current.clone(),
            debounce: self.debounce,
            sink,
        };
        *pending = Some(self.runtime.spawn(task.run()));

        Some(session)
    }

    /// Drop any pending session without starting a new one
    pub fn cancel(&self) {
        let mut pending = self.pending.lock();
        self.supersede(SessionState::Idle);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }

    /// Bump the generation and return it
    fn supersede(&self, next: SessionState) -> u64 {
        let mut current = self.current.lock();
        let ended = match current.state {
            SessionState::Debouncing => Some(SessionState::Cancelled),
            SessionState::Searching => Some(SessionState::Discarded),
            _ => None,
        };
        if let Some(ended) = ended {
            tracing::trace!("generation {}: {:?}", current.generation, ended);
            current.outcome = Some(ended);
        }
        current.generation += 1;
        current.set(next);
        current.generation
    }

    /// Generation of the most recent keystroke event
    pub fn generation(&self) -> u64 {
        self.current.lock().generation
    }

    /// State of the most recent session
    pub fn state(&self) -> SessionState {
        self.current.lock().state
    }

    /// Terminal state of the most recently ended session: `Rendered`,
    /// `Cancelled` or `Discarded`
    pub fn last_outcome(&self) -> Option<SessionState> {
        self.current.lock().outcome
    }

    /// Follow state changes of the latest session
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.current.lock().states.subscribe()
    }

    /// Wait until the latest session is no longer debouncing or searching
    pub async fn settled(&self) -> SessionState {
        let mut states = self.subscribe();
        let settled = match states.wait_for(|state| !state.is_active()).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        };
        settled
    }

    pub fn is_current(&self, session: &QuerySession) -> bool {
        self.generation() == session.generation
    }
}

impl QueryHandler for SearchController {
    fn trigger(&self) -> &str {
        &self.trigger
    }

    fn synopsis(&self) -> &str {
        crate::SYNOPSIS
    }

    fn handle_query(&self, text: &str, sink: Arc<dyn ResultSink>) {
        self.submit(text, sink);
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.get_mut().take() {
            pending.abort();
        }
    }
}

/// Everything a spawned session needs, owned
struct SessionTask {
    session: QuerySession,
    daemon: Arc<dyn Daemon>,
    presenter: Arc<Presenter>,
    current: Arc<Mutex<Current>>,
    debounce: Duration,
    sink: Arc<dyn ResultSink>,
}

impl SessionTask {
    /// Move to `next` if this session is still the latest one
    fn advance(&self, next: SessionState) -> bool {
        let mut current = self.current.lock();
        if current.generation != self.session.generation {
            return false;
        }
        current.set(next);
        true
    }

    async fn run(self) {
        let generation = self.session.generation;

        tokio::time::sleep(self.debounce).await;
        if !self.advance(SessionState::Searching) {
            return;
        }

        let entries = if self.daemon.is_available() {
            tracing::debug!("generation {}: searching {:?}", generation, self.session.text);
            let response = self.daemon.send(Request::search(self.session.text.as_str())).await;
            self.presenter.present(&self.session.text, response)
        } else {
            tracing::debug!("generation {}: daemon not running, skipping search", generation);
            vec![self.presenter.daemon_absent()]
        };

        // A newer keystroke already recorded this session as discarded
        let mut current = self.current.lock();
        if current.generation != generation {
            return;
        }
        self.sink.publish(entries);
        current.set(SessionState::Rendered);
        current.outcome = Some(SessionState::Rendered);
        tracing::trace!("generation {}: rendered", generation);
    }
}
