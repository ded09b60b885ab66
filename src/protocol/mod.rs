//! # Handshake Protocol
//!
//! Request header decoding and the API versions response.
//!
//! ## Flow
//! 1. [`header::RequestHeader::decode`] reads the fixed 8-byte header from a frame body
//! 2. [`api_versions::ApiVersionsResponse::negotiate`] applies the version policy
//! 3. [`api_versions::ApiVersionsResponse::encode`] writes the response body
//!
//! The framing layer (`core::codec`) adds the length prefix.

pub mod api_versions;
pub mod header;
