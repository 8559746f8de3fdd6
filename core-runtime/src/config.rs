//! # Core Configuration Module
//!
//! Configuration for the import pipeline and the services it talks to.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! holding API endpoints, credentials, pipeline tuning and the HTTP transport.
//! Validation is fail-fast: a config that builds is one the pipeline can run
//! with.
//!
//! ## Required Settings
//!
//! - Streaming access token (the playlist is written on the user's behalf)
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - HTTP operations (desktop default: reqwest)
//!
//! When the `desktop-shims` feature is enabled a `ReqwestHttpClient` using the
//! configured catalog user agent is injected automatically if none is provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .streaming_access_token("BQD...")
//!     .catalog_token("discogs-personal-token")
//!     .lookup_interval_ms(250)
//!     .build()?;
//! ```
//!
//! ### From the environment
//!
//! ```ignore
//! let config = CoreConfigBuilder::from_env().build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::HttpClient;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_CATALOG_BASE_URL: &str = "https://api.discogs.com";
pub const DEFAULT_STREAMING_BASE_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_USER_AGENT: &str = "Spinlist/0.1.0";
pub const DEFAULT_LOOKUP_INTERVAL_MS: u64 = 200;
pub const DEFAULT_IMPORT_TIMEOUT_SECS: u64 = 300;

const MAX_LOOKUP_INTERVAL_MS: u64 = 60_000;

/// Environment variables read by [`CoreConfigBuilder::from_env`].
pub mod env_keys {
    pub const CATALOG_TOKEN: &str = "SPINLIST_DISCOGS_TOKEN";
    pub const CATALOG_BASE_URL: &str = "SPINLIST_DISCOGS_BASE_URL";
    pub const USER_AGENT: &str = "SPINLIST_USER_AGENT";
    pub const STREAMING_TOKEN: &str = "SPINLIST_SPOTIFY_TOKEN";
    pub const STREAMING_BASE_URL: &str = "SPINLIST_SPOTIFY_BASE_URL";
    pub const LOOKUP_INTERVAL_MS: &str = "SPINLIST_LOOKUP_INTERVAL_MS";
    pub const IMPORT_TIMEOUT_SECS: &str = "SPINLIST_IMPORT_TIMEOUT_SECS";
}

/// Core configuration.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Source catalog API settings
    pub catalog: CatalogApiConfig,

    /// Destination streaming API settings
    pub streaming: StreamingApiConfig,

    /// Pipeline tuning
    pub import: ImportSettings,

    /// HTTP client shared by both providers (optional with desktop default)
    pub http_client: Option<Arc<dyn HttpClient>>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("catalog", &self.catalog)
            .field("streaming", &self.streaming)
            .field("import", &self.import)
            .field(
                "http_client",
                &self.http_client.as_ref().map(|_| "HttpClient { ... }"),
            )
            .finish()
    }
}

/// Catalog (Discogs-style) API configuration.
///
/// The token is optional: public collections and lists can be read
/// anonymously, at a lower rate limit.
#[derive(Clone, PartialEq, Eq)]
pub struct CatalogApiConfig {
    pub base_url: String,
    /// Personal access token
    pub token: Option<String>,
    /// User agent in `Name/Version` form; the API rejects anonymous agents
    pub user_agent: String,
}

impl Default for CatalogApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl std::fmt::Debug for CatalogApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl CatalogApiConfig {
    pub fn validate(&self) -> Result<()> {
        validate_base_url("Catalog", &self.base_url)?;

        match self.user_agent.split_once('/') {
            Some((name, version)) if !name.trim().is_empty() && !version.trim().is_empty() => {}
            _ => {
                return Err(Error::Config(
                    "Catalog user agent must follow format: 'AppName/Version'".to_string(),
                ))
            }
        }

        if matches!(self.token.as_deref(), Some(token) if token.trim().is_empty()) {
            return Err(Error::Config(
                "Catalog token cannot be empty when provided".to_string(),
            ));
        }

        Ok(())
    }
}

/// Streaming (Spotify-style) Web API configuration.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StreamingApiConfig {
    pub base_url: String,
    /// OAuth bearer token obtained by the authentication collaborator
    pub access_token: String,
}

impl std::fmt::Debug for StreamingApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingApiConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl StreamingApiConfig {
    pub fn validate(&self) -> Result<()> {
        validate_base_url("Streaming", &self.base_url)?;

        if self.access_token.trim().is_empty() {
            return Err(Error::CapabilityMissing {
                capability: "StreamingAccessToken".to_string(),
                message: "A streaming access token is required to create playlists. \
                          Complete the login flow or set SPINLIST_SPOTIFY_TOKEN."
                    .to_string(),
            });
        }

        Ok(())
    }
}

/// Pipeline tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSettings {
    /// Minimum interval between two album lookup starts
    pub lookup_interval_ms: u64,
    /// Deadline for a whole import run
    pub import_timeout_secs: u64,
    /// Whether created playlists are public
    pub playlist_public: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            lookup_interval_ms: DEFAULT_LOOKUP_INTERVAL_MS,
            import_timeout_secs: DEFAULT_IMPORT_TIMEOUT_SECS,
            playlist_public: false,
        }
    }
}

impl ImportSettings {
    pub fn lookup_interval(&self) -> Duration {
        Duration::from_millis(self.lookup_interval_ms)
    }

    pub fn import_timeout(&self) -> Duration {
        Duration::from_secs(self.import_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lookup_interval_ms == 0 {
            return Err(Error::Config(
                "Lookup interval must be greater than 0ms".to_string(),
            ));
        }

        if self.lookup_interval_ms > MAX_LOOKUP_INTERVAL_MS {
            return Err(Error::Config(
                "Lookup interval exceeds maximum of 60 seconds (60,000ms)".to_string(),
            ));
        }

        if self.import_timeout_secs == 0 {
            return Err(Error::Config(
                "Import timeout must be greater than 0s".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_base_url(service: &str, url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(Error::Config(format!("{} base URL cannot be empty", service)));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(Error::Config(format!(
            "{} base URL must start with http:// or https://: {}",
            service, url
        )));
    }
    Ok(())
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates every section of the configuration.
    pub fn validate(&self) -> Result<()> {
        self.catalog.validate()?;
        self.streaming.validate()?;
        self.import.validate()?;
        Ok(())
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(user_agent: &str) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::with_user_agent(user_agent, Duration::from_secs(30))
        .map_err(|e| Error::Transport(e.to_string()))?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_user_agent: &str) -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required to reach the catalog and streaming APIs. \
                 Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient. \
                 Other hosts: inject a platform HttpClient."
            .to_string(),
    })
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Call [`build()`](CoreConfigBuilder::build) to validate and create the
/// final config.
#[derive(Default)]
pub struct CoreConfigBuilder {
    catalog_base_url: Option<String>,
    catalog_token: Option<String>,
    user_agent: Option<String>,
    streaming_base_url: Option<String>,
    streaming_access_token: Option<String>,
    lookup_interval_ms: Option<u64>,
    import_timeout_secs: Option<u64>,
    playlist_public: Option<bool>,
    http_client: Option<Arc<dyn HttpClient>>,
    invalid_env: Vec<(&'static str, String)>,
}

impl CoreConfigBuilder {
    /// Seed a builder from the process environment.
    ///
    /// See [`env_keys`] for the variable names. Unset variables leave the
    /// default in place; unparsable numbers surface from
    /// [`build()`](Self::build).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Seed a builder from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::default();

        if let Some(token) = lookup(env_keys::CATALOG_TOKEN) {
            builder = builder.catalog_token(token);
        }
        if let Some(url) = lookup(env_keys::CATALOG_BASE_URL) {
            builder = builder.catalog_base_url(url);
        }
        if let Some(user_agent) = lookup(env_keys::USER_AGENT) {
            builder = builder.user_agent(user_agent);
        }
        if let Some(token) = lookup(env_keys::STREAMING_TOKEN) {
            builder = builder.streaming_access_token(token);
        }
        if let Some(url) = lookup(env_keys::STREAMING_BASE_URL) {
            builder = builder.streaming_base_url(url);
        }
        if let Some(raw) = lookup(env_keys::LOOKUP_INTERVAL_MS) {
            match raw.trim().parse() {
                Ok(ms) => builder = builder.lookup_interval_ms(ms),
                Err(_) => builder.invalid_env.push((env_keys::LOOKUP_INTERVAL_MS, raw)),
            }
        }
        if let Some(raw) = lookup(env_keys::IMPORT_TIMEOUT_SECS) {
            match raw.trim().parse() {
                Ok(secs) => builder = builder.import_timeout_secs(secs),
                Err(_) => builder.invalid_env.push((env_keys::IMPORT_TIMEOUT_SECS, raw)),
            }
        }

        builder
    }

    pub fn catalog_base_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_base_url = Some(url.into());
        self
    }

    pub fn catalog_token(mut self, token: impl Into<String>) -> Self {
        self.catalog_token = Some(token.into());
        self
    }

    /// User agent sent to the catalog API (and by the default HTTP client).
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn streaming_base_url(mut self, url: impl Into<String>) -> Self {
        self.streaming_base_url = Some(url.into());
        self
    }

    pub fn streaming_access_token(mut self, token: impl Into<String>) -> Self {
        self.streaming_access_token = Some(token.into());
        self
    }

    /// Minimum interval between album lookup starts.
    ///
    /// Default: 200ms
    pub fn lookup_interval_ms(mut self, interval_ms: u64) -> Self {
        self.lookup_interval_ms = Some(interval_ms);
        self
    }

    /// Deadline for a whole import.
    ///
    /// Default: 300s
    pub fn import_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.import_timeout_secs = Some(timeout_secs);
        self
    }

    /// Default: false
    pub fn playlist_public(mut self, public: bool) -> Self {
        self.playlist_public = Some(public);
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) is used when the
    /// `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidEnv`] for an unparsable environment number
    /// - [`Error::Config`] for malformed values (URLs, user agent, intervals)
    /// - [`Error::CapabilityMissing`] when the streaming token or, without
    ///   `desktop-shims`, the HTTP client is missing
    pub fn build(self) -> Result<CoreConfig> {
        if let Some((key, value)) = self.invalid_env.into_iter().next() {
            return Err(Error::InvalidEnv {
                key: key.to_string(),
                value,
            });
        }

        let defaults = ImportSettings::default();
        let config = CoreConfig {
            catalog: CatalogApiConfig {
                base_url: self
                    .catalog_base_url
                    .unwrap_or_else(|| DEFAULT_CATALOG_BASE_URL.to_string()),
                token: self.catalog_token,
                user_agent: self
                    .user_agent
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            },
            streaming: StreamingApiConfig {
                base_url: self
                    .streaming_base_url
                    .unwrap_or_else(|| DEFAULT_STREAMING_BASE_URL.to_string()),
                access_token: self.streaming_access_token.unwrap_or_default(),
            },
            import: ImportSettings {
                lookup_interval_ms: self
                    .lookup_interval_ms
                    .unwrap_or(defaults.lookup_interval_ms),
                import_timeout_secs: self
                    .import_timeout_secs
                    .unwrap_or(defaults.import_timeout_secs),
                playlist_public: self.playlist_public.unwrap_or(defaults.playlist_public),
            },
            http_client: None,
        };

        config.validate()?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(&config.catalog.user_agent)?,
        };

        Ok(CoreConfig {
            http_client: Some(http_client),
            ..config
        })
    }
}
