//! # Discogs Provider
//!
//! Implements the `CatalogSource` port over the Discogs REST API.
//!
//! ## Overview
//!
//! This module provides:
//! - Collection and wantlist pages following the `pagination.urls.next` cursor
//! - Curated list items parsed from their `"Artist - Title"` display strings
//! - Personal access token authentication (`Authorization: Discogs token=...`)
//!
//! Retries and backoff live in the `HttpClient` transport, not here.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::DiscogsConnector;
pub use error::{DiscogsError, Result};
