//! # Handshake Broker
//!
//! A minimal broker speaking a length-prefixed, big-endian request/response
//! protocol. It answers exactly one request type, the API versions handshake,
//! with the list of API key ranges it supports.
//!
//! ## Modules
//! - [`core`]: frame codec (`[Length(4)] [Body]`)
//! - [`protocol`]: request header, version policy, response layout
//! - [`transport`]: TCP acceptor and per-connection loop
//! - [`service`]: handshake client
//! - [`config`], [`error`], [`utils`]: configuration, errors, logging and metrics
//!
//! ## Example
//! ```no_run
//! use handshake_broker::config::{ServerConfig, BROKER_ADDRESS};
//! use handshake_broker::transport::remote::{bind, ctrl_c_shutdown, Broker};
//!
//! # async fn run() -> handshake_broker::error::Result<()> {
//! let listener = bind(BROKER_ADDRESS).await?;
//! Broker::new(&ServerConfig::default())
//!     .serve(listener, ctrl_c_shutdown())
//!     .await
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;
pub mod utils;

pub use error::{ProtocolError, Result};
