//! # Bridge Traits
//!
//! The contract between the import pipeline and everything outside it.
//!
//! ## Traits
//!
//! ### Transport
//! - [`HttpClient`](http::HttpClient) - Async HTTP with transport-level retry
//!
//! ### Ports
//! - [`CatalogSource`](catalog::CatalogSource) - Collection, wantlist and list browsing
//! - [`AlbumSearch`](streaming::AlbumSearch) - Streaming-service album lookup
//! - [`PlaylistWriter`](streaming::PlaylistWriter) - Playlist creation and batched writes
//!
//! ### Utilities
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All traits use [`BridgeError`](error::BridgeError). Implementations keep
//! the taxonomy intact when converting their own errors: a `401` must stay
//! `Unauthorized`, a non-success status must keep its code and body.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` so port handles can be shared by the
//! concurrently running lookup tasks.

pub mod catalog;
pub mod error;
pub mod http;
pub mod log;
pub mod streaming;

pub use error::BridgeError;

pub use catalog::{CatalogEntry, CatalogPage, CatalogSource};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use streaming::{
    AlbumId, AlbumSearch, CreatedPlaylist, PlaylistWriter, SearchKey, TrackUri,
    MAX_ALBUMS_PER_LOOKUP, MAX_TRACKS_PER_WRITE,
};
