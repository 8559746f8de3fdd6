//! # Import Pipeline
//!
//! Turns a catalog URL (collection, wantlist or curated list) into a
//! populated streaming playlist.
//!
//! ## Components
//!
//! - **URL Resolver** (`query`): free-form URL to typed query
//! - **Catalog Paginator** (`paginator`): walks cursor-linked catalog pages
//! - **Entry Normalizer** (`normalize`): catalog entry to search key
//! - **Rate-Limited Resolver** (`resolver`): throttled concurrent album search
//! - **Dedup/Filter** (`dedup`): unmatched and repeated ids removed
//! - **Playlist Builder** (`builder`): batched track expansion and writes
//! - **Orchestrator** (`pipeline`): sequences the stages and reports progress
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_import::{ImportPipeline, ImportRequest, PipelineConfig};
//! use core_async::sync::CancellationToken;
//!
//! let pipeline = ImportPipeline::new(catalog, search, writer, PipelineConfig::default());
//! let result = pipeline
//!     .run(&ImportRequest::new("discogs.com/user/digger/collection"), &CancellationToken::new())
//!     .await?;
//! println!("{} albums -> {}", result.matched_album_count, result.url);
//! ```

pub mod builder;
pub mod dedup;
pub mod error;
pub mod normalize;
pub mod paginator;
pub mod pipeline;
pub mod query;
pub mod resolver;

pub use builder::{batches, PlaylistBuilder, PlaylistSummary};
pub use dedup::dedup_album_ids;
pub use error::{ErrorKind, ImportError, LookupFailure, Result};
pub use normalize::normalize;
pub use paginator::fetch_all;
pub use pipeline::{ImportPipeline, ImportRequest, PipelineConfig, PlaylistResult};
pub use query::{resolve, QueryKind, ResolvedQuery};
pub use resolver::{RateLimitedResolver, DEFAULT_LOOKUP_INTERVAL};
