//! # Client Services
//!
//! Higher-level clients built on the transport layer.

pub mod client;
