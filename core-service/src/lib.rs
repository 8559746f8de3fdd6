//! Core service façade and bootstrap helpers.
//!
//! This crate wires the configured transport into the Discogs and Spotify
//! connectors and hands them to the import pipeline. Desktop builds enable
//! the `desktop-shims` feature, which supplies a reqwest-backed
//! `HttpClient` when the configuration does not carry one.
//!
//! ```no_run
//! # async fn example() -> core_service::Result<()> {
//! use core_runtime::config::CoreConfigBuilder;
//! use core_service::{ImportRequest, ImportResponse, ImportService};
//!
//! let config = CoreConfigBuilder::from_env().build()?;
//! let service = ImportService::from_config(&config)?;
//! let result = service
//!     .import(&ImportRequest::new("https://www.discogs.com/user/digger/collection"))
//!     .await?;
//! println!("{}", ImportResponse::from(&result).url);
//! # Ok(())
//! # }
//! ```

pub mod boundary;
pub mod error;
pub mod service;

pub use boundary::{BoundaryResponse, ImportResponse, LOGIN_ROUTE};
pub use core_import::{ImportError, ImportRequest, PlaylistResult};
pub use error::{CoreError, Result};
pub use service::{ImportPorts, ImportService};
