//! Responses sent from the daemon to the client

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// Response from daemon to client.
///
/// The daemon does not tag its responses; the shape is recovered from which
/// keys are present. Exactly one variant is produced per decoded object, with
/// a non-empty `error` taking precedence over `results`, and `results` over
/// `success`. An object carrying none of them reads as an empty search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Search { results: Vec<ResultItem> },
    Play { success: bool },
    Error { error: ErrorTag },
}

impl Response {
    pub fn error(tag: ErrorTag) -> Self {
        Response::Error { error: tag }
    }

    /// `true` only for a play envelope reporting success
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Play { success: true })
    }

    pub fn error_tag(&self) -> Option<&ErrorTag> {
        match self {
            Response::Error { error } => Some(error),
            _ => None,
        }
    }
}

/// Raw envelope as it appears on the wire, before classification
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    results: Option<Vec<ResultItem>>,
    #[serde(default)]
    success: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl From<Envelope> for Response {
    fn from(envelope: Envelope) -> Self {
        if let Some(message) = envelope.error.as_ref().and_then(error_message) {
            return Response::Error {
                error: ErrorTag::from(message),
            };
        }
        if let Some(results) = envelope.results {
            return Response::Search { results };
        }
        if let Some(success) = envelope.success.filter(|v| !v.is_null()) {
            return Response::Play {
                success: is_truthy(&success),
            };
        }
        Response::Search { results: vec![] }
    }
}

impl<'de> Deserialize<'de> for Response {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Envelope::deserialize(deserializer).map(Response::from)
    }
}

/// Loose JSON truthiness: null, false, zero and empty strings, arrays or
/// objects are all false
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Extract a displayable message from the `error` field.
///
/// Falsy values mean "no error". Anything else that is not a string is shown
/// as its JSON text.
fn error_message(value: &Value) -> Option<String> {
    if !is_truthy(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Error tag carried by an error envelope.
///
/// The first three are produced by the client itself when the round trip
/// fails; anything else is a message from the daemon, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorTag {
    Timeout,
    Connection,
    Parse,
    Daemon(String),
}

impl ErrorTag {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorTag::Timeout => "timeout",
            ErrorTag::Connection => "connection",
            ErrorTag::Parse => "parse",
            ErrorTag::Daemon(message) => message,
        }
    }
}

impl From<String> for ErrorTag {
    fn from(s: String) -> Self {
        match s.as_str() {
            "timeout" => ErrorTag::Timeout,
            "connection" => ErrorTag::Connection,
            "parse" => ErrorTag::Parse,
            _ => ErrorTag::Daemon(s),
        }
    }
}

impl From<&str> for ErrorTag {
    fn from(s: &str) -> Self {
        ErrorTag::from(s.to_string())
    }
}

impl From<ErrorTag> for String {
    fn from(tag: ErrorTag) -> Self {
        match tag {
            ErrorTag::Daemon(message) => message,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single search result.
///
/// Every field is decoded leniently: a mistyped value falls back to its
/// default instead of failing the whole result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    #[serde(default = "default_title", deserialize_with = "title_or_default")]
    pub title: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub subtitle: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub item_key: String,

    /// Search results spell this one in camelCase, unlike the play request
    #[serde(
        default,
        rename = "sessionKey",
        alias = "session_key",
        deserialize_with = "lenient_text"
    )]
    pub session_key: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_optional_text"
    )]
    pub category_key: Option<String>,

    /// Position of the item inside its daemon-side category
    #[serde(default, deserialize_with = "lenient_index")]
    pub index: usize,

    /// Free-form classification (track, album, artist, ...)
    #[serde(
        rename = "type",
        default = "default_kind",
        deserialize_with = "kind_or_default"
    )]
    pub kind: String,

    /// Local path to cover art, if the daemon has cached one
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_image"
    )]
    pub image: Option<PathBuf>,

    #[serde(default, deserialize_with = "lenient_actions")]
    pub actions: Vec<ActionDescriptor>,
}

/// A daemon-declared action on a result. The title doubles as its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
}

impl ActionDescriptor {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }
}

fn default_title() -> String {
    "Unknown".to_string()
}

fn default_kind() -> String {
    "track".to_string()
}

/// Strings verbatim, numbers and booleans printed, anything else dropped
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn title_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_else(default_title))
}

fn kind_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?)
        .filter(|kind| !kind.is_empty())
        .unwrap_or_else(default_kind))
}

/// Non-negative integers (or numeric strings); anything else is 0
fn lenient_index<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let index = match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(index.and_then(|i| usize::try_from(i).ok()).unwrap_or(0))
}

fn lenient_image<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(path) if !path.is_empty() => Ok(Some(PathBuf::from(path))),
        _ => Ok(None),
    }
}

/// Objects with a `title`, or bare title strings; other entries are skipped
fn lenient_actions<'de, D>(deserializer: D) -> Result<Vec<ActionDescriptor>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(vec![]);
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(mut map) => Some(ActionDescriptor {
                title: map.remove("title").and_then(scalar_text).unwrap_or_default(),
            }),
            Value::String(title) => Some(ActionDescriptor::new(title)),
            _ => None,
        })
        .collect())
}
