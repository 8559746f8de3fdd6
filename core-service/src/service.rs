//! Import service
//!
//! Owns the three ports and runs imports under a deadline.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{AlbumSearch, CatalogSource, PlaylistWriter};
use core_async::sync::CancellationToken;
use core_import::{ImportError, ImportPipeline, ImportRequest, PipelineConfig, PlaylistResult};
use core_runtime::config::{CoreConfig, ImportSettings};
use core_runtime::events::{EventBus, EventStream, DEFAULT_EVENT_BUFFER_SIZE};
use provider_discogs::DiscogsConnector;
use provider_spotify::SpotifyConnector;
use tracing::{info, warn};

use crate::error::{CoreError, Result};

/// The catalog and streaming collaborators an import needs.
#[derive(Clone)]
pub struct ImportPorts {
    pub catalog: Arc<dyn CatalogSource>,
    pub search: Arc<dyn AlbumSearch>,
    pub writer: Arc<dyn PlaylistWriter>,
}

impl ImportPorts {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        search: Arc<dyn AlbumSearch>,
        writer: Arc<dyn PlaylistWriter>,
    ) -> Self {
        Self {
            catalog,
            search,
            writer,
        }
    }

    /// Build the Discogs and Spotify connectors over the configured transport.
    pub fn from_config(config: &CoreConfig) -> Result<Self> {
        let http_client = config
            .http_client
            .clone()
            .ok_or_else(|| CoreError::CapabilityMissing {
                capability: "http_client".to_string(),
                message: "CoreConfig carries no HttpClient".to_string(),
            })?;

        let catalog = DiscogsConnector::from_config(Arc::clone(&http_client), &config.catalog);
        let streaming = Arc::new(
            SpotifyConnector::from_config(http_client, &config.streaming)
                .with_public_playlists(config.import.playlist_public),
        );

        Ok(Self {
            catalog: Arc::new(catalog),
            search: streaming.clone(),
            writer: streaming,
        })
    }
}

/// Primary façade exposed to the CLI and any HTTP boundary.
#[derive(Clone)]
pub struct ImportService {
    pipeline: ImportPipeline,
    events: EventBus,
    timeout: Duration,
}

impl ImportService {
    pub fn new(ports: ImportPorts, settings: &ImportSettings) -> Self {
        let events = EventBus::new(DEFAULT_EVENT_BUFFER_SIZE);
        let pipeline = ImportPipeline::new(
            ports.catalog,
            ports.search,
            ports.writer,
            PipelineConfig::from(settings),
        )
        .with_events(events.clone());

        Self {
            pipeline,
            events,
            timeout: settings.import_timeout(),
        }
    }

    pub fn from_config(config: &CoreConfig) -> Result<Self> {
        Ok(Self::new(ImportPorts::from_config(config)?, &config.import))
    }

    /// Deadline applied to each import.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to progress of every import this service runs.
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    /// Run one import with the service deadline.
    pub async fn import(&self, request: &ImportRequest) -> std::result::Result<PlaylistResult, ImportError> {
        self.import_with_cancel(request, &CancellationToken::new()).await
    }

    /// Run one import, stopping early when `cancel` fires or the deadline
    /// passes.
    ///
    /// On timeout the token is cancelled and the run is still awaited, so
    /// in-flight lookups finish before `Cancelled` is returned. Dropping the
    /// returned future cancels the run as well.
    pub async fn import_with_cancel(
        &self,
        request: &ImportRequest,
        cancel: &CancellationToken,
    ) -> std::result::Result<PlaylistResult, ImportError> {
        let run_token = cancel.child_token();
        let _guard = run_token.clone().drop_guard();

        let mut run = Box::pin(self.pipeline.run(request, &run_token));

        core_async::select! {
            result = &mut run => return result,
            _ = core_async::sleep(self.timeout) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Import deadline passed, cancelling");
                run_token.cancel();
            }
        }

        let result = run.await;
        if let Ok(playlist) = &result {
            info!(playlist_id = %playlist.id, "Import finished after deadline");
        }
        result
    }
}
