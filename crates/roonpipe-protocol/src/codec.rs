//! Byte-level encoding of requests and responses

use crate::{Request, Response};

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Malformed response: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Serialize a request into the bytes written to the socket
pub fn encode(request: &Request) -> Result<Vec<u8>, ProtocolError> {
    serde_json::to_vec(request).map_err(ProtocolError::Encode)
}

/// Parse everything the daemon wrote before closing the connection.
///
/// This only checks that the payload is a well-formed JSON object of the
/// expected shape; error strings from the daemon are passed through as-is.
pub fn decode(bytes: &[u8]) -> Result<Response, ProtocolError> {
    serde_json::from_slice(bytes).map_err(ProtocolError::Decode)
}
