//! Streaming Service Ports
//!
//! Two narrow traits over the destination service: album search, and
//! playlist creation/population. Both report expired or missing
//! credentials as [`BridgeError::Unauthorized`](crate::error::BridgeError::Unauthorized)
//! so the caller can trigger re-authentication.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Streaming-service album identifier.
pub type AlbumId = String;

/// Streaming-service identifier of one playable track.
pub type TrackUri = String;

/// Maximum album ids per track lookup call.
pub const MAX_ALBUMS_PER_LOOKUP: usize = 20;

/// Maximum track URIs per playlist write call.
pub const MAX_TRACKS_PER_WRITE: usize = 100;

/// Minimal search key derived from a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchKey {
    /// Comma-joined artist names, billing order preserved
    pub artist: String,
    /// Title with surrounding whitespace trimmed
    pub title: String,
}

impl SearchKey {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }
}

/// A playlist freshly created on the streaming service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPlaylist {
    pub id: String,
    pub url: String,
}

/// Album search trait
#[async_trait]
pub trait AlbumSearch: Send + Sync {
    /// Find the best matching album for `key`.
    ///
    /// Returns `Ok(None)` when the search has no results; that is not an
    /// error.
    async fn search_album(&self, key: &SearchKey) -> Result<Option<AlbumId>>;
}

/// Playlist mutation trait
///
/// Callers respect [`MAX_ALBUMS_PER_LOOKUP`] and [`MAX_TRACKS_PER_WRITE`];
/// implementations may reject larger batches.
#[async_trait]
pub trait PlaylistWriter: Send + Sync {
    /// Create an empty playlist owned by the authenticated user.
    async fn create_playlist(&self, name: &str, description: &str) -> Result<CreatedPlaylist>;

    /// Expand albums into their track URIs, in the order the service returns them.
    async fn album_track_uris(&self, album_ids: &[AlbumId]) -> Result<Vec<TrackUri>>;

    /// Append tracks to an existing playlist.
    async fn add_tracks(&self, playlist_id: &str, uris: &[TrackUri]) -> Result<()>;
}
