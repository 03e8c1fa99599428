//! Dispatching requests through a transport.
//!
//! The message model never performs I/O itself. This module defines the
//! [`Transport`] seam, the wire types passed across it, the [`fetch`]
//! entry point, and a reference implementation over `reqwest`.
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── transport - Transport trait, TransportRequest / TransportResponse
//! ├── fetch     - fetch() and ReqwestTransport
//! ├── config    - Client configuration
//! └── utils     - Retry helpers
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Transport`] | Async trait a host implements to perform network I/O |
//! | [`TransportRequest`] | Encoded request with flattened headers and directives |
//! | [`TransportResponse`] | Status, headers and body returned by a transport |
//! | [`ReqwestTransport`] | `reqwest`-backed transport with retry and abort support |
//! | [`ClientConfig`] | Transport configuration options |
//!
//! # Examples
//!
//! ## Creating a Transport
//!
//! ```
//! use fetch_model::client::{ClientConfig, ReqwestTransport};
//!
//! // Default configuration: no retries
//! let transport = ReqwestTransport::new().unwrap();
//!
//! // Custom configuration
//! let config = ClientConfig {
//!     max_retries: 5,
//!     retry_delay_ms: 2000,
//!     ..Default::default()
//! };
//! let transport = ReqwestTransport::with_config(config).unwrap();
//! assert_eq!(transport.config().max_retries, 5);
//! ```
//!
//! ## Utility Functions
//!
//! ```
//! use fetch_model::client::{exponential_backoff, is_retryable_status};
//! use std::time::Duration;
//!
//! assert!(is_retryable_status(503));
//! assert!(!is_retryable_status(404));
//!
//! let delay = exponential_backoff(2, 100);
//! assert_eq!(delay, Duration::from_millis(400));
//! ```

mod config;
mod fetch;
mod transport;
mod utils;

pub use config::ClientConfig;
pub use fetch::{fetch, ReqwestTransport};
pub use transport::{Transport, TransportRequest, TransportResponse};
pub use utils::*;
