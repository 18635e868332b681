//! Requests sent from the client to the daemon

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Request from client to daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Request {
    /// Free-text search
    Search { query: String },
    /// Start playback of (or enqueue) a search result
    Play(PlayRequest),
}

impl Request {
    pub fn search(query: impl Into<String>) -> Self {
        Request::Search { query: query.into() }
    }

    /// Name of the command discriminator, as written on the wire
    pub fn command(&self) -> &'static str {
        match self {
            Request::Search { .. } => "search",
            Request::Play(_) => "play",
        }
    }
}

impl From<PlayRequest> for Request {
    fn from(play: PlayRequest) -> Self {
        Request::Play(play)
    }
}

/// The two play shapes the daemon has been seen to accept.
///
/// Older daemons take one of four fixed actions; newer ones declare their own
/// actions per search result and expect the chosen title back along with the
/// category and position of the item. Neither shape is treated as canonical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayRequest {
    /// Fixed action enum
    Action {
        item_key: String,
        session_key: String,
        action: PlayAction,
    },
    /// Daemon-declared action, referenced by its title
    Titled {
        item_key: String,
        session_key: String,
        category_key: String,
        item_index: usize,
        action_title: String,
    },
}

impl PlayRequest {
    pub fn action(
        item_key: impl Into<String>,
        session_key: impl Into<String>,
        action: PlayAction,
    ) -> Self {
        PlayRequest::Action {
            item_key: item_key.into(),
            session_key: session_key.into(),
            action,
        }
    }

    pub fn titled(
        item_key: impl Into<String>,
        session_key: impl Into<String>,
        category_key: impl Into<String>,
        item_index: usize,
        action_title: impl Into<String>,
    ) -> Self {
        PlayRequest::Titled {
            item_key: item_key.into(),
            session_key: session_key.into(),
            category_key: category_key.into(),
            item_index,
            action_title: action_title.into(),
        }
    }

    pub fn item_key(&self) -> &str {
        match self {
            PlayRequest::Action { item_key, .. } | PlayRequest::Titled { item_key, .. } => item_key,
        }
    }

    pub fn session_key(&self) -> &str {
        match self {
            PlayRequest::Action { session_key, .. } | PlayRequest::Titled { session_key, .. } => {
                session_key
            }
        }
    }
}

/// Fixed play actions understood by the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayAction {
    Play,
    PlayNow,
    AddNext,
    Queue,
}

impl PlayAction {
    /// All fixed actions, in menu order
    pub const ALL: [PlayAction; 4] = [
        PlayAction::Play,
        PlayAction::PlayNow,
        PlayAction::AddNext,
        PlayAction::Queue,
    ];

    /// Wire name (e.g. `playNow`)
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayAction::Play => "play",
            PlayAction::PlayNow => "playNow",
            PlayAction::AddNext => "addNext",
            PlayAction::Queue => "queue",
        }
    }

    /// Human-readable label (e.g. `Play Now`)
    pub fn title(&self) -> &'static str {
        match self {
            PlayAction::Play => "Play",
            PlayAction::PlayNow => "Play Now",
            PlayAction::AddNext => "Add Next",
            PlayAction::Queue => "Queue",
        }
    }
}

impl fmt::Display for PlayAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayAction {
    type Err = String;

    /// Accepts the wire name, or the snake_case spelling used for action ids
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play" => Ok(PlayAction::Play),
            "playNow" | "play_now" => Ok(PlayAction::PlayNow),
            "addNext" | "add_next" => Ok(PlayAction::AddNext),
            "queue" => Ok(PlayAction::Queue),
            other => Err(format!(
                "unknown play action '{}' (expected play, playNow, addNext or queue)",
                other
            )),
        }
    }
}
