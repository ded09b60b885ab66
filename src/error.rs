//! # Error Types
//!
//! Error handling for the handshake broker.
//!
//! Every failure the broker can hit is a variant of [`ProtocolError`], from
//! low-level socket errors to malformed frames and headers.
//!
//! ## Error Categories
//! - **I/O Errors**: bind, accept, read and write failures
//! - **Framing Errors**: negative, oversized or truncated frames
//! - **Codec Errors**: truncated request headers, malformed responses
//! - **Configuration Errors**: unreadable or invalid configuration
//!
//! An out-of-range requested version is *not* an error here: it is answered
//! with error code 35 inside a well-formed response.
//!
//! ## Example Usage
//! ```rust
//! use handshake_broker::error::{ProtocolError, Result};
//! use handshake_broker::protocol::header::RequestHeader;
//! use bytes::Bytes;
//!
//! fn parse(frame: Bytes) -> Result<i32> {
//!     let mut frame = frame;
//!     let header = RequestHeader::decode(&mut frame)?;
//!     Ok(header.correlation_id)
//! }
//!
//! match parse(Bytes::from_static(&[0x00, 0x12])) {
//!     Err(ProtocolError::TruncatedHeader(2)) => {}
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use std::io;
use thiserror::Error;

// ProtocolError is the primary error type for all broker operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Negative frame length: {0}")]
    NegativeFrameLength(i32),

    #[error("Frame too large: {0} bytes")]
    OversizedFrame(usize),

    #[error("Truncated frame: needed {needed} bytes, stream ended after {available}")]
    TruncatedFrame { needed: usize, available: usize },

    #[error("Truncated request header: {0} bytes (need 8)")]
    TruncatedHeader(usize),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Too many supported APIs to encode: {0}")]
    TooManyApis(usize),

    #[error("Invalid supported API list: {0}")]
    InvalidSupportedApis(String),

    #[error("Correlation id mismatch: sent {expected}, received {received}")]
    CorrelationMismatch { expected: i32, received: i32 },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
