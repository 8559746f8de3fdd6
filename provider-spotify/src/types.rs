//! Spotify Web API request and response types
//!
//! See: https://developer.spotify.com/documentation/web-api

use serde::{Deserialize, Serialize};

/// Generic paging object
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Paging<T> {
    #[serde(default)]
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: u32,
}

/// `GET /search?type=album`
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub albums: Paging<SimplifiedAlbum>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimplifiedAlbum {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// `GET /albums?ids=...`; unknown ids come back as `null`
#[derive(Debug, Deserialize)]
pub struct AlbumsResponse {
    pub albums: Vec<Option<Album>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Album {
    pub id: String,
    pub tracks: Paging<SimplifiedTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimplifiedTrack {
    pub uri: String,
}

/// `POST /me/playlists` body
#[derive(Debug, Serialize)]
pub struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub public: bool,
}

#[derive(Debug, Deserialize)]
pub struct Playlist {
    pub id: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: String,
}

/// `POST /playlists/{id}/tracks` body
#[derive(Debug, Serialize)]
pub struct AddTracksRequest<'a> {
    pub uris: &'a [String],
}

/// Regular error object: `{"error": {"status": 401, "message": "..."}}`
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorObject,
}

#[derive(Debug, Deserialize)]
pub struct ErrorObject {
    pub status: u16,
    #[serde(default)]
    pub message: String,
}
