//! Unix socket transport to the RoonPipe daemon
//!
//! Every request gets its own connection: connect, write the request,
//! read until the daemon hangs up, decode. Nothing is kept between calls and
//! nothing is retried.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use roonpipe_protocol::{codec, Request, Response};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

use crate::config::DaemonConfig;
use crate::error::{Result, RoonpipeError};

/// Something that can answer protocol requests.
///
/// `send` never fails: transport and decoding problems come back as an
/// error envelope carrying the matching tag.
#[async_trait]
pub trait Daemon: Send + Sync {
    /// Whether the daemon looks reachable, without opening a connection
    fn is_available(&self) -> bool;

    async fn send(&self, request: Request) -> Response;
}

/// Client for the daemon's local stream socket
#[derive(Debug, Clone)]
pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout,
        }
    }

    pub fn from_config(config: &DaemonConfig) -> Self {
        Self::new(config.socket_path.clone(), config.timeout())
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send a request and decode the reply, reporting failures as errors
    pub async fn try_send(&self, request: &Request) -> Result<Response> {
        if !self.is_available() {
            return Err(RoonpipeError::DaemonNotRunning(self.socket_path.clone()));
        }

        let payload = codec::encode(request)?;

        let raw = tokio::time::timeout(self.timeout, self.round_trip(&payload))
            .await
            .map_err(|_| RoonpipeError::Timeout(self.timeout))??;

        tracing::debug!(
            "{} request: {} bytes out, {} bytes back",
            request.command(),
            payload.len(),
            raw.len()
        );

        Ok(codec::decode(&raw)?)
    }

    /// One connection: write everything, then read until EOF.
    /// The stream is dropped (and closed) on every return path.
    async fn round_trip(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(RoonpipeError::DaemonConnection)?;

        stream
            .write_all(payload)
            .await
            .map_err(RoonpipeError::DaemonConnection)?;

        let mut response = Vec::with_capacity(4096);
        stream
            .read_to_end(&mut response)
            .await
            .map_err(RoonpipeError::DaemonConnection)?;

        Ok(response)
    }
}

#[async_trait]
impl Daemon for DaemonClient {
    fn is_available(&self) -> bool {
        self.socket_path.exists()
    }

    async fn send(&self, request: Request) -> Response {
        match self.try_send(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("{} request failed: {}", request.command(), e);
                Response::error(e.tag())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roonpipe_protocol::{ErrorTag, PlayAction, PlayRequest};
    use std::sync::Arc;
    use tempfile::tempdir;
    use tokio::net::UnixListener;
    use tokio::sync::Mutex;

    /// Accept one connection, read the request, reply with `chunks` and close
    async fn serve_once(
        listener: UnixListener,
        chunks: Vec<Vec<u8>>,
        seen: Arc<Mutex<Vec<u8>>>,
    ) {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let n = stream.read(&mut buf).await.unwrap();
        seen.lock().await.extend_from_slice(&buf[..n]);

        for chunk in chunks {
            stream.write_all(&chunk).await.unwrap();
            stream.flush().await.unwrap();
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_search_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roonpipe.sock");
        let listener = UnixListener::bind(&path).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let body = br#"{"results":[{"title":"So What","type":"track"},{"title":"Kind of Blue","type":"album"}]}"#;
        // Split the reply to check that every chunk up to EOF is kept
        let (head, tail) = body.split_at(17);
        let server = tokio::spawn(serve_once(
            listener,
            vec![head.to_vec(), tail.to_vec()],
            seen.clone(),
        ));

        let client = DaemonClient::new(&path, Duration::from_secs(5));
        assert!(client.is_available());

        let response = client.send(Request::search("miles davis")).await;
        server.await.unwrap();

        assert_eq!(
            seen.lock().await.as_slice(),
            br#"{"command":"search","query":"miles davis"}"#
        );
        match response {
            Response::Search { results } => {
                assert_eq!(results.len(), 2);
                assert_eq!(results[1].kind, "album");
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_play_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roonpipe.sock");
        let listener = UnixListener::bind(&path).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let server = tokio::spawn(serve_once(
            listener,
            vec![br#"{"success":true}"#.to_vec()],
            seen.clone(),
        ));

        let client = DaemonClient::new(&path, Duration::from_secs(5));
        let request = PlayRequest::action("X", "Y", PlayAction::Queue).into();
        let response = client.send(request).await;
        server.await.unwrap();

        assert_eq!(
            seen.lock().await.as_slice(),
            br#"{"command":"play","item_key":"X","session_key":"Y","action":"queue"}"#
        );
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_missing_socket_is_connection_error() {
        let dir = tempdir().unwrap();
        let client = DaemonClient::new(dir.path().join("absent.sock"), Duration::from_secs(1));

        assert!(!client.is_available());
        assert!(matches!(
            client.try_send(&Request::search("x")).await,
            Err(RoonpipeError::DaemonNotRunning(_))
        ));
        assert_eq!(
            client.send(Request::search("x")).await,
            Response::error(ErrorTag::Connection)
        );
    }

    #[tokio::test]
    async fn test_refused_connection_is_connection_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stale.sock");
        // Binding and dropping leaves the socket file behind with nobody listening
        drop(std::os::unix::net::UnixListener::bind(&path).unwrap());

        let client = DaemonClient::new(&path, Duration::from_secs(1));
        assert!(client.is_available());
        assert_eq!(
            client.send(Request::search("x")).await,
            Response::error(ErrorTag::Connection)
        );
    }

    #[tokio::test]
    async fn test_garbage_reply_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roonpipe.sock");
        let listener = UnixListener::bind(&path).unwrap();
        let server = tokio::spawn(serve_once(
            listener,
            vec![b"<html>nope</html>".to_vec()],
            Arc::new(Mutex::new(Vec::new())),
        ));

        let client = DaemonClient::new(&path, Duration::from_secs(5));
        let err = client.try_send(&Request::search("x")).await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, RoonpipeError::Protocol(_)));
        assert_eq!(err.tag(), ErrorTag::Parse);
    }

    #[tokio::test]
    async fn test_silent_daemon_times_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roonpipe.sock");
        let listener = UnixListener::bind(&path).unwrap();

        // Accept and hold the connection open without ever answering
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(stream);
        });

        let client = DaemonClient::new(&path, Duration::from_millis(100));
        assert_eq!(
            client.send(Request::search("x")).await,
            Response::error(ErrorTag::Timeout)
        );
        server.abort();
    }

    #[tokio::test]
    async fn test_daemon_error_passes_through() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roonpipe.sock");
        let listener = UnixListener::bind(&path).unwrap();
        let server = tokio::spawn(serve_once(
            listener,
            vec![br#"{"error":"No Roon core paired"}"#.to_vec()],
            Arc::new(Mutex::new(Vec::new())),
        ));

        let client = DaemonClient::new(&path, Duration::from_secs(5));
        let response = client.send(Request::search("x")).await;
        server.await.unwrap();

        assert_eq!(
            response,
            Response::error(ErrorTag::Daemon("No Roon core paired".into()))
        );
    }
}
