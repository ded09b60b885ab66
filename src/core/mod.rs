//! # Core Protocol Components
//!
//! Low-level framing over byte streams.
//!
//! ## Components
//! - **Codec**: Tokio codec that splits a byte stream into frame bodies and
//!   prefixes outbound bodies with their length
//!
//! ## Wire Format
//! ```text
//! [Length(4, big-endian)] [Body(Length)]
//! ```
//!
//! ## Security
//! - Maximum frame size: 16MB by default (prevents memory exhaustion)
//! - Negative lengths are rejected
//! - Length validation before allocation

pub mod codec;
