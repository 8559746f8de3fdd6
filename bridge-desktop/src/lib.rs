//! # Desktop Bridge Implementations
//!
//! Default transport for native hosts (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` with rustls, connection pooling and
//!   retry/backoff on `429` and `5xx`
//!
//! Retries live here and only here; the import pipeline above this layer
//! treats every failure it sees as final.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use std::sync::Arc;
//!
//! let http = Arc::new(ReqwestHttpClient::with_user_agent("Spinlist/0.1", timeout)?);
//! let catalog = DiscogsConnector::new(http.clone(), token, "Spinlist/0.1");
//! ```

mod http;

pub use http::{ReqwestHttpClient, DEFAULT_USER_AGENT};
