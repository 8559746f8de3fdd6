//! Spotify Web API connector
//!
//! Implements `AlbumSearch` and `PlaylistWriter` for the Spotify Web API.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::streaming::{
    AlbumId, AlbumSearch, CreatedPlaylist, PlaylistWriter, SearchKey, TrackUri,
    MAX_ALBUMS_PER_LOOKUP, MAX_TRACKS_PER_WRITE,
};
use core_runtime::config::{StreamingApiConfig, DEFAULT_STREAMING_BASE_URL};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::SpotifyError;
use crate::types::{
    AddTracksRequest, Album, AlbumsResponse, CreatePlaylistRequest, ErrorResponse, Paging,
    Playlist, SearchResponse, SimplifiedTrack,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Spotify Web API connector
///
/// One instance serves a single user's access token. Playlists are created
/// private unless [`SpotifyConnector::with_public_playlists`] says otherwise.
pub struct SpotifyConnector {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    access_token: String,
    public_playlists: bool,
}

impl SpotifyConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: DEFAULT_STREAMING_BASE_URL.to_string(),
            access_token: access_token.into(),
            public_playlists: false,
        }
    }

    pub fn from_config(http_client: Arc<dyn HttpClient>, config: &StreamingApiConfig) -> Self {
        Self::new(http_client, config.access_token.clone()).with_base_url(config.base_url.clone())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_public_playlists(mut self, public: bool) -> Self {
        self.public_playlists = public;
        self
    }

    /// Field-filtered search query, e.g. `album:Catholic Boy artist:Jim Carroll`.
    fn search_query(key: &SearchKey) -> String {
        if key.artist.is_empty() {
            format!("album:{}", key.title)
        } else {
            format!("album:{} artist:{}", key.title, key.artist)
        }
    }

    fn search_url(&self, key: &SearchKey) -> String {
        format!(
            "{}/search?q={}&type=album&limit=1",
            self.base_url,
            urlencoding::encode(&Self::search_query(key))
        )
    }

    fn authorized(&self, request: HttpRequest) -> HttpRequest {
        request
            .bearer_token(self.access_token.as_str())
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
    }

    async fn send(&self, request: HttpRequest) -> crate::Result<HttpResponse> {
        let response = self.http_client.execute(self.authorized(request)).await?;
        Self::check_status(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> crate::Result<T> {
        let response = self.send(HttpRequest::get(url)).await?;
        response
            .json()
            .map_err(|e| SpotifyError::ParseError(e.to_string()))
    }

    /// All track URIs of `album`, following `tracks.next` past the first page.
    ///
    /// A cursor pointing outside the configured API is not followed.
    async fn all_album_tracks(&self, album: Album) -> crate::Result<Vec<TrackUri>> {
        let mut uris: Vec<TrackUri> = album.tracks.items.into_iter().map(|t| t.uri).collect();
        let mut next = album.tracks.next;

        while let Some(url) = next.take() {
            if !url.starts_with(&format!("{}/", self.base_url)) {
                warn!(album = %album.id, cursor = %url, "Ignoring foreign track cursor");
                break;
            }
            let page: Paging<SimplifiedTrack> = self.get_json(url).await?;
            uris.extend(page.items.into_iter().map(|t| t.uri));
            next = page.next;
        }

        Ok(uris)
    }

    fn check_status(response: HttpResponse) -> crate::Result<HttpResponse> {
        if response.is_success() {
            debug!("Spotify request succeeded: status={}", response.status);
            return Ok(response);
        }

        if response.status == 401 || response.status == 403 {
            let message = response
                .json::<ErrorResponse>()
                .map(|e| e.error.message)
                .unwrap_or_else(|_| response.text_lossy());
            warn!("Spotify rejected access token: status={}", response.status);
            return Err(SpotifyError::Unauthorized {
                status: response.status,
                message,
            });
        }

        warn!("Spotify request failed: status={}", response.status);
        Err(SpotifyError::ApiError {
            status: response.status,
            body: response.text_lossy(),
        })
    }
}

#[async_trait]
impl AlbumSearch for SpotifyConnector {
    #[instrument(skip(self), fields(artist = %key.artist, title = %key.title))]
    async fn search_album(&self, key: &SearchKey) -> Result<Option<AlbumId>> {
        let body: SearchResponse = self.get_json(self.search_url(key)).await?;

        let album_id = body
            .albums
            .items
            .into_iter()
            .next()
            .map(|album| album.id)
            .filter(|id| !id.is_empty());

        if album_id.is_none() {
            debug!("No album found");
        }

        Ok(album_id)
    }
}

#[async_trait]
impl PlaylistWriter for SpotifyConnector {
    #[instrument(skip(self, description))]
    async fn create_playlist(&self, name: &str, description: &str) -> Result<CreatedPlaylist> {
        let request = HttpRequest::post(format!("{}/me/playlists", self.base_url)).json(
            &CreatePlaylistRequest {
                name,
                description,
                public: self.public_playlists,
            },
        )?;

        let response = self.send(request).await?;
        let playlist: Playlist = response
            .json()
            .map_err(|e| SpotifyError::ParseError(e.to_string()))?;

        info!("Created Spotify playlist {}", playlist.id);

        Ok(CreatedPlaylist {
            id: playlist.id,
            url: playlist.external_urls.spotify,
        })
    }

    #[instrument(skip(self, album_ids), fields(albums = album_ids.len()))]
    async fn album_track_uris(&self, album_ids: &[AlbumId]) -> Result<Vec<TrackUri>> {
        if album_ids.len() > MAX_ALBUMS_PER_LOOKUP {
            return Err(SpotifyError::BatchTooLarge {
                limit: MAX_ALBUMS_PER_LOOKUP,
                got: album_ids.len(),
            }
            .into());
        }
        if album_ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/albums?ids={}", self.base_url, album_ids.join(","));
        let body: AlbumsResponse = self.get_json(url).await?;

        let mut uris: Vec<TrackUri> = Vec::new();
        for album in body.albums.into_iter().flatten() {
            uris.extend(self.all_album_tracks(album).await?);
        }

        debug!("Expanded {} albums into {} tracks", album_ids.len(), uris.len());

        Ok(uris)
    }

    #[instrument(skip(self, uris), fields(tracks = uris.len()))]
    async fn add_tracks(&self, playlist_id: &str, uris: &[TrackUri]) -> Result<()> {
        if uris.len() > MAX_TRACKS_PER_WRITE {
            return Err(SpotifyError::BatchTooLarge {
                limit: MAX_TRACKS_PER_WRITE,
                got: uris.len(),
            }
            .into());
        }

        let url = format!(
            "{}/playlists/{}/tracks",
            self.base_url,
            urlencoding::encode(playlist_id)
        );
        let request = HttpRequest::post(url).json(&AddTracksRequest { uris })?;
        self.send(request).await?;

        Ok(())
    }
}
