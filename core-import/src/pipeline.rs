//! # Pipeline Orchestrator
//!
//! Runs one import end to end:
//!
//! ```text
//! resolve URL -> fetch catalog -> normalize -> resolve albums -> dedup -> build playlist
//! ```
//!
//! The first failing stage ends the run. An empty catalog is rejected with
//! [`ImportError::EmptyResult`] before any album lookup happens.

use bridge_traits::{AlbumSearch, CatalogSource, PlaylistWriter};
use core_async::sync::CancellationToken;
use core_runtime::config::ImportSettings;
use core_runtime::events::{EventBus, ImportEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::builder::{PlaylistBuilder, PlaylistSummary};
use crate::dedup::dedup_album_ids;
use crate::error::{ImportError, Result};
use crate::normalize::normalize_all;
use crate::paginator::fetch_all;
use crate::query::{resolve, ResolvedQuery};
use crate::resolver::{RateLimitedResolver, DEFAULT_LOOKUP_INTERVAL};

/// Publish to an optional bus; a bus with no subscribers is not an error.
pub(crate) fn publish(bus: Option<&EventBus>, event: ImportEvent) {
    if let Some(bus) = bus {
        let _ = bus.emit(event);
    }
}

/// Pipeline tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Minimum spacing between album lookup starts
    pub lookup_interval: core_async::Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lookup_interval: DEFAULT_LOOKUP_INTERVAL,
        }
    }
}

impl From<&ImportSettings> for PipelineConfig {
    fn from(settings: &ImportSettings) -> Self {
        Self {
            lookup_interval: settings.lookup_interval(),
        }
    }
}

/// What to import and how to name the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRequest {
    /// Free-form catalog URL
    pub url: String,
    /// Playlist name; derived from the query when absent
    pub name: Option<String>,
    /// Playlist description; `"Imported from <url>"` when absent
    pub description: Option<String>,
}

impl ImportRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn playlist_name(&self, query: &ResolvedQuery) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| query.default_playlist_name())
    }

    fn playlist_description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Imported from {}", self.url.trim()))
    }
}

/// Summary of a finished import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistResult {
    pub id: String,
    pub url: String,
    /// Entries fetched from the catalog, duplicates included
    pub source_entry_count: usize,
    /// Distinct albums found on the streaming service
    pub matched_album_count: usize,
    pub track_count: usize,
}

/// The import pipeline, wired to its three ports.
#[derive(Clone)]
pub struct ImportPipeline {
    catalog: Arc<dyn CatalogSource>,
    resolver: RateLimitedResolver,
    builder: PlaylistBuilder,
    events: Option<EventBus>,
}

impl ImportPipeline {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        search: Arc<dyn AlbumSearch>,
        writer: Arc<dyn PlaylistWriter>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            catalog,
            resolver: RateLimitedResolver::new(search, config.lookup_interval),
            builder: PlaylistBuilder::new(writer),
            events: None,
        }
    }

    /// Publish progress to `events`.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.builder = self.builder.with_events(events.clone());
        self.events = Some(events);
        self
    }

    /// Run one import.
    ///
    /// Emits `Failed` or `Cancelled` on the event bus before returning an
    /// error.
    #[instrument(skip(self, cancel), fields(url = %request.url))]
    pub async fn run(
        &self,
        request: &ImportRequest,
        cancel: &CancellationToken,
    ) -> Result<PlaylistResult> {
        let outcome = self.run_stages(request, cancel).await;

        match &outcome {
            Ok(result) => {
                info!(
                    playlist_id = %result.id,
                    source_entries = result.source_entry_count,
                    matched_albums = result.matched_album_count,
                    "Import completed"
                );
                self.publish(ImportEvent::Completed {
                    playlist_id: result.id.clone(),
                    source_entries: result.source_entry_count,
                    matched_albums: result.matched_album_count,
                });
            }
            Err(ImportError::Cancelled) => {
                warn!("Import cancelled");
                self.publish(ImportEvent::Cancelled);
            }
            Err(error) => {
                warn!(kind = %error.kind(), error = %error, "Import failed");
                self.publish(ImportEvent::Failed {
                    message: error.to_string(),
                    kind: error.kind().to_string(),
                });
            }
        }

        outcome
    }

    async fn run_stages(
        &self,
        request: &ImportRequest,
        cancel: &CancellationToken,
    ) -> Result<PlaylistResult> {
        let query = resolve(&request.url)?;
        info!(kind = %query.kind, id = %query.identifier, "Resolved catalog URL");
        self.publish(ImportEvent::Started {
            source: request.url.clone(),
            kind: query.kind.to_string(),
        });

        let entries = fetch_all(self.catalog.as_ref(), &query, cancel).await?;
        self.publish(ImportEvent::CatalogFetched {
            entries: entries.len(),
        });
        if entries.is_empty() {
            return Err(ImportError::EmptyResult);
        }

        let keys = normalize_all(&entries);
        let resolved = self.resolver.resolve_all(&keys, cancel).await?;
        let not_found = resolved.iter().filter(|id| id.is_none()).count();

        let album_ids = dedup_album_ids(resolved);
        info!(
            entries = entries.len(),
            matched = album_ids.len(),
            not_found,
            "Albums resolved"
        );
        self.publish(ImportEvent::AlbumsResolved {
            matched: album_ids.len(),
            not_found,
            total: keys.len(),
        });

        let name = request.playlist_name(&query);
        let description = request.playlist_description();
        let PlaylistSummary {
            id,
            url,
            track_count,
            ..
        } = self
            .builder
            .build(&name, &description, &album_ids, cancel)
            .await?;

        Ok(PlaylistResult {
            id,
            url,
            source_entry_count: entries.len(),
            matched_album_count: album_ids.len(),
            track_count,
        })
    }

    fn publish(&self, event: ImportEvent) {
        publish(self.events.as_ref(), event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let request = ImportRequest::new(" https://www.discogs.com/user/digger/collection ");
        let query = ResolvedQuery::collection("digger");

        assert_eq!(request.playlist_name(&query), "digger's collection");
        assert_eq!(
            request.playlist_description(),
            "Imported from https://www.discogs.com/user/digger/collection"
        );
    }

    #[test]
    fn test_explicit_names_win() {
        let request = ImportRequest::new("https://www.discogs.com/lists/x/1")
            .with_name("Punk")
            .with_description("Loud");
        let query = ResolvedQuery::list("1");

        assert_eq!(request.playlist_name(&query), "Punk");
        assert_eq!(request.playlist_description(), "Loud");
    }

    #[test]
    fn test_blank_name_falls_back() {
        let request = ImportRequest::new("u").with_name("   ");
        assert_eq!(request.playlist_name(&ResolvedQuery::list("7")), "List 7");
    }

    #[test]
    fn test_config_from_settings() {
        let settings = ImportSettings {
            lookup_interval_ms: 350,
            ..ImportSettings::default()
        };
        assert_eq!(
            PipelineConfig::from(&settings).lookup_interval,
            core_async::Duration::from_millis(350)
        );
        assert_eq!(
            PipelineConfig::default().lookup_interval,
            DEFAULT_LOOKUP_INTERVAL
        );
    }
}
