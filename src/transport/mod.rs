//! # Transport Layer
//!
//! TCP acceptor, per-connection handshake loop and client connector.
//!
//! One tokio task serves each accepted connection. Tasks share nothing but
//! the read-only advertised API list and the metrics counters.

pub mod remote;
