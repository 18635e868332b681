//! Turning daemon responses into entries a launcher can show

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use roonpipe_protocol::{ErrorTag, PlayAction, PlayRequest, Request, Response, ResultItem};

use crate::client::Daemon;
use crate::config::{ActionModel, PresenterConfig};

pub const ID_NOT_RUNNING: &str = "roonpipe-not-running";
pub const ID_ERROR: &str = "roonpipe-error";
pub const ID_NO_RESULTS: &str = "roonpipe-no-results";

/// Whether an entry is a search hit or an informational row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Item,
    Advisory,
}

/// One row handed to the host for display
#[derive(Debug, Clone)]
pub struct DisplayEntry {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub icon: IconSource,
    pub actions: Vec<EntryAction>,
    pub kind: EntryKind,
}

impl DisplayEntry {
    fn advisory(id: &str, title: impl Into<String>, subtitle: impl Into<String>, icon: IconSource) -> Self {
        Self {
            id: id.to_string(),
            title: title.into(),
            subtitle: subtitle.into(),
            icon,
            actions: vec![],
            kind: EntryKind::Advisory,
        }
    }

    pub fn is_advisory(&self) -> bool {
        self.kind == EntryKind::Advisory
    }

    pub fn action(&self, id: &str) -> Option<&EntryAction> {
        self.actions.iter().find(|a| a.id == id)
    }
}

/// Icon for an entry, read from disk only when asked for.
///
/// Each entry owns its own resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSource {
    path: PathBuf,
}

impl IconSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

/// A play action bound to one result. Invoking it takes no arguments.
#[derive(Clone)]
pub struct EntryAction {
    pub id: String,
    pub title: String,
    request: PlayRequest,
    daemon: Arc<dyn Daemon>,
}

impl EntryAction {
    pub fn request(&self) -> &PlayRequest {
        &self.request
    }

    /// Send the play request; `true` only if the daemon reports success
    pub async fn invoke(&self) -> bool {
        let response = self.daemon.send(Request::Play(self.request.clone())).await;
        let success = response.is_success();
        if !success {
            tracing::debug!("'{}' on {} did not take: {:?}", self.title, self.request.item_key(), response);
        }
        success
    }
}

impl fmt::Debug for EntryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryAction")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

/// Maps responses to display entries
pub struct Presenter {
    daemon: Arc<dyn Daemon>,
    action_model: ActionModel,
    fallback_icon: PathBuf,
}

impl Presenter {
    pub fn new(daemon: Arc<dyn Daemon>, config: &PresenterConfig) -> Self {
        Self {
            daemon,
            action_model: config.action_model,
            fallback_icon: config.fallback_icon.clone(),
        }
    }

    /// Build the entries for a search response to `query`
    pub fn present(&self, query: &str, response: Response) -> Vec<DisplayEntry> {
        match response {
            Response::Error { error } => vec![self.error_entry(&error)],
            Response::Search { results } if !results.is_empty() => results
                .iter()
                .enumerate()
                .map(|(position, item)| self.result_entry(position, item))
                .collect(),
            _ => vec![self.no_results_entry(query)],
        }
    }

    /// Entry shown instead of searching when the daemon socket is missing
    pub fn daemon_absent(&self) -> DisplayEntry {
        DisplayEntry::advisory(
            ID_NOT_RUNNING,
            "RoonPipe is not running",
            "Start RoonPipe daemon first: roonpipe",
            self.fallback(),
        )
    }

    fn error_entry(&self, tag: &ErrorTag) -> DisplayEntry {
        DisplayEntry::advisory(
            ID_ERROR,
            error_text(tag),
            "Error occurred while searching Roon tracks",
            self.fallback(),
        )
    }

    fn no_results_entry(&self, query: &str) -> DisplayEntry {
        DisplayEntry::advisory(
            ID_NO_RESULTS,
            "No tracks found",
            format!("No results for \"{}\"", query),
            self.fallback(),
        )
    }

    fn result_entry(&self, position: usize, item: &ResultItem) -> DisplayEntry {
        let type_label = capitalize(&item.kind);
        let subtitle = if item.subtitle.is_empty() {
            type_label
        } else {
            format!("{} • {}", type_label, item.subtitle)
        };

        DisplayEntry {
            id: format!("{}-{}", item.kind, position),
            title: item.title.clone(),
            subtitle,
            icon: self.icon_for(item),
            actions: self.actions_for(item),
            kind: EntryKind::Item,
        }
    }

    /// Cover art if the daemon cached it locally, otherwise the bundled icon
    fn icon_for(&self, item: &ResultItem) -> IconSource {
        match &item.image {
            Some(image) if !image.as_os_str().is_empty() && image.exists() => {
                IconSource::new(image.clone())
            }
            _ => self.fallback(),
        }
    }

    fn actions_for(&self, item: &ResultItem) -> Vec<EntryAction> {
        match self.action_model {
            ActionModel::Declared => item
                .actions
                .iter()
                .filter(|action| !action.title.is_empty())
                .map(|action| EntryAction {
                    id: action_id(&action.title),
                    title: action.title.clone(),
                    request: PlayRequest::titled(
                        item.item_key.clone(),
                        item.session_key.clone(),
                        item.category_key.clone().unwrap_or_default(),
                        item.index,
                        action.title.clone(),
                    ),
                    daemon: self.daemon.clone(),
                })
                .collect(),
            ActionModel::Fixed => PlayAction::ALL
                .iter()
                .map(|action| EntryAction {
                    id: action_id(action.title()),
                    title: action.title().to_string(),
                    request: PlayRequest::action(item.item_key.clone(), item.session_key.clone(), *action),
                    daemon: self.daemon.clone(),
                })
                .collect(),
        }
    }

    fn fallback(&self) -> IconSource {
        IconSource::new(self.fallback_icon.clone())
    }
}

/// Message shown for an error tag
pub fn error_text(tag: &ErrorTag) -> &str {
    match tag {
        ErrorTag::Timeout => "Request timed out",
        ErrorTag::Connection => "Socket connection closed",
        ErrorTag::Parse => "Invalid response from RoonPipe",
        ErrorTag::Daemon(message) => message,
    }
}

/// `"play now"` -> `"play_now"`
pub fn action_id(title: &str) -> String {
    title.to_lowercase().replace(' ', "_")
}

/// Upper-case the first character and lower-case the rest (`"ALBUM"` -> `"Album"`)
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use roonpipe_protocol::ActionDescriptor;
    use tempfile::tempdir;

    /// Records play requests and answers with a fixed response
    struct Recorder {
        reply: Response,
        sent: Mutex<Vec<Request>>,
    }

    impl Recorder {
        fn new(reply: Response) -> Arc<Self> {
            Arc::new(Self {
                reply,
                sent: Mutex::new(vec![]),
            })
        }
    }

    #[async_trait]
    impl Daemon for Recorder {
        fn is_available(&self) -> bool {
            true
        }

        async fn send(&self, request: Request) -> Response {
            self.sent.lock().push(request);
            self.reply.clone()
        }
    }

    fn presenter(daemon: Arc<dyn Daemon>, action_model: ActionModel) -> Presenter {
        let config = PresenterConfig {
            action_model,
            fallback_icon: PathBuf::from("/usr/share/roonpipe/roon.png"),
        };
        Presenter::new(daemon, &config)
    }

    fn item(title: &str, kind: &str, subtitle: &str) -> ResultItem {
        ResultItem {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            item_key: format!("key-{}", title),
            session_key: "session-1".to_string(),
            category_key: Some("cat-7".to_string()),
            index: 3,
            kind: kind.to_string(),
            image: None,
            actions: vec![ActionDescriptor::new("Play Now"), ActionDescriptor::new("Add to Queue")],
        }
    }

    #[test]
    fn test_results_keep_order_and_ids() {
        let p = presenter(Recorder::new(Response::Play { success: true }), ActionModel::Declared);
        let response = Response::Search {
            results: vec![item("So What", "track", "Miles Davis"), item("Freddie Freeloader", "track", "")],
        };

        let entries = p.present("miles davis", response);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "track-0");
        assert_eq!(entries[1].id, "track-1");
        assert_eq!(entries[0].title, "So What");
        assert_eq!(entries[0].subtitle, "Track • Miles Davis");
        assert_eq!(entries[1].subtitle, "Track");
        assert!(entries.iter().all(|e| !e.is_advisory()));
    }

    #[test]
    fn test_mistyped_result_is_still_presented() {
        let p = presenter(Recorder::new(Response::Play { success: true }), ActionModel::Declared);
        let response = roonpipe_protocol::decode(
            br#"{"results":[
                {"title":1999,"subtitle":"Prince","item_key":"k1","sessionKey":"s","index":-1,"type":"album","actions":[{"title":"Play Now"}]},
                {"title":"Purple Rain","subtitle":"Prince","item_key":"k2","sessionKey":"s","index":1,"type":"track","actions":[{"title":"Play Now"}]}
            ]}"#,
        )
        .unwrap();

        let entries = p.present("prince", response);
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["1999", "Purple Rain"]);
        assert!(entries.iter().all(|e| !e.is_advisory()));
        assert_eq!(
            entries[0].action("play_now").unwrap().request(),
            &PlayRequest::titled("k1", "s", "", 0, "Play Now")
        );
    }

    #[test]
    fn test_type_is_capitalized() {
        let p = presenter(Recorder::new(Response::Play { success: true }), ActionModel::Declared);
        let entries = p.present("x", Response::Search { results: vec![item("Kind of Blue", "ALBUM", "")] });
        assert_eq!(entries[0].subtitle, "Album");
        assert_eq!(entries[0].id, "ALBUM-0");
    }

    #[test]
    fn test_error_messages() {
        let p = presenter(Recorder::new(Response::Play { success: true }), ActionModel::Declared);
        let cases = [
            (ErrorTag::Timeout, "Request timed out"),
            (ErrorTag::Connection, "Socket connection closed"),
            (ErrorTag::Parse, "Invalid response from RoonPipe"),
            (ErrorTag::Daemon("Roon core lost".into()), "Roon core lost"),
        ];

        for (tag, text) in cases {
            let entries = p.present("x", Response::error(tag));
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].id, ID_ERROR);
            assert_eq!(entries[0].title, text);
            assert!(entries[0].is_advisory());
            assert!(entries[0].actions.is_empty());
        }
    }

    #[test]
    fn test_no_results() {
        let p = presenter(Recorder::new(Response::Play { success: true }), ActionModel::Declared);
        for response in [Response::Search { results: vec![] }, Response::Play { success: true }] {
            let entries = p.present("zzz", response);
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].id, ID_NO_RESULTS);
            assert_eq!(entries[0].title, "No tracks found");
            assert_eq!(entries[0].subtitle, "No results for \"zzz\"");
        }
    }

    #[test]
    fn test_daemon_absent_entry() {
        let p = presenter(Recorder::new(Response::Play { success: true }), ActionModel::Declared);
        let entry = p.daemon_absent();
        assert_eq!(entry.id, ID_NOT_RUNNING);
        assert_eq!(entry.title, "RoonPipe is not running");
        assert_eq!(entry.icon.path(), Path::new("/usr/share/roonpipe/roon.png"));
    }

    #[test]
    fn test_icons_resolve_per_entry() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.jpg");
        let second = dir.path().join("second.jpg");
        std::fs::write(&first, b"one").unwrap();
        std::fs::write(&second, b"two").unwrap();

        let mut a = item("A", "track", "");
        a.image = Some(first.clone());
        let mut b = item("B", "track", "");
        b.image = Some(second.clone());
        let mut c = item("C", "track", "");
        c.image = Some(dir.path().join("missing.jpg"));

        let p = presenter(Recorder::new(Response::Play { success: true }), ActionModel::Declared);
        let entries = p.present("x", Response::Search { results: vec![a, b, c] });

        assert_eq!(entries[0].icon.path(), first.as_path());
        assert_eq!(entries[1].icon.path(), second.as_path());
        assert_eq!(entries[2].icon.path(), Path::new("/usr/share/roonpipe/roon.png"));
        assert_eq!(entries[0].icon.load().unwrap(), b"one");
        assert_eq!(entries[1].icon.load().unwrap(), b"two");
    }

    #[test]
    fn test_declared_actions() {
        let p = presenter(Recorder::new(Response::Play { success: true }), ActionModel::Declared);
        let mut hit = item("So What", "track", "");
        hit.actions.push(ActionDescriptor::new(""));

        let entries = p.present("x", Response::Search { results: vec![hit] });
        let ids: Vec<&str> = entries[0].actions.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["play_now", "add_to_queue"]);
        assert_eq!(
            entries[0].actions[1].request(),
            &PlayRequest::titled("key-So What", "session-1", "cat-7", 3, "Add to Queue")
        );
    }

    #[test]
    fn test_fixed_actions() {
        let p = presenter(Recorder::new(Response::Play { success: true }), ActionModel::Fixed);
        let entries = p.present("x", Response::Search { results: vec![item("So What", "track", "")] });

        let ids: Vec<&str> = entries[0].actions.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["play", "play_now", "add_next", "queue"]);
        assert_eq!(
            entries[0].action("queue").unwrap().request(),
            &PlayRequest::action("key-So What", "session-1", PlayAction::Queue)
        );
    }

    #[tokio::test]
    async fn test_invoke_sends_bound_request() {
        let daemon = Recorder::new(Response::Play { success: true });
        let p = presenter(daemon.clone(), ActionModel::Declared);
        let entries = p.present("x", Response::Search { results: vec![item("So What", "track", "")] });

        assert!(entries[0].action("play_now").unwrap().invoke().await);
        assert_eq!(
            daemon.sent.lock().as_slice(),
            &[Request::Play(PlayRequest::titled("key-So What", "session-1", "cat-7", 3, "Play Now"))]
        );
    }

    #[tokio::test]
    async fn test_invoke_reports_failure() {
        for reply in [
            Response::Play { success: false },
            Response::error(ErrorTag::Connection),
            Response::Search { results: vec![] },
        ] {
            let p = presenter(Recorder::new(reply), ActionModel::Fixed);
            let entries = p.present("x", Response::Search { results: vec![item("So What", "track", "")] });
            assert!(!entries[0].actions[0].invoke().await);
        }
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("track"), "Track");
        assert_eq!(capitalize("ALBUM"), "Album");
        assert_eq!(capitalize(""), "");
    }
}
