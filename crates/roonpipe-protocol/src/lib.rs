//! roonpipe-protocol - Wire types for talking to the RoonPipe daemon
//!
//! The daemon listens on a Unix stream socket and speaks plain JSON:
//! - one request object per connection, written by the client
//! - one response object per connection, terminated by the daemon closing
//!   its end (there is no length prefix and no delimiter)
//!
//! This crate only describes the messages and how they map to bytes.
//! Socket handling lives in `roonpipe-core`.

pub mod codec;
pub mod request;
pub mod response;

pub use codec::{decode, encode, ProtocolError};
pub use request::{PlayAction, PlayRequest, Request};
pub use response::{ActionDescriptor, ErrorTag, Response, ResultItem};
