//! Discogs API response types
//!
//! Only the fields the importer reads are modelled; serde ignores the rest.

use serde::Deserialize;

/// Pagination envelope shared by collection and wantlist responses
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub pages: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub items: u32,
    #[serde(default)]
    pub urls: PaginationUrls,
}

/// Links to neighbouring pages; absent on the last page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationUrls {
    pub next: Option<String>,
    pub last: Option<String>,
}

/// `GET /users/{username}/collection/folders/0/releases`
#[derive(Debug, Deserialize)]
pub struct CollectionResponse {
    pub pagination: Pagination,
    #[serde(default)]
    pub releases: Vec<Release>,
}

/// `GET /users/{username}/wants`
#[derive(Debug, Deserialize)]
pub struct WantsResponse {
    pub pagination: Pagination,
    #[serde(default)]
    pub wants: Vec<Release>,
}

/// A collection item or want; both wrap the same release summary
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub id: u64,
    pub basic_information: BasicInformation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BasicInformation {
    pub title: String,
    #[serde(default)]
    pub artists: Vec<ArtistCredit>,
    #[serde(default)]
    pub year: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistCredit {
    pub name: String,
}

/// `GET /lists/{list_id}`
#[derive(Debug, Deserialize)]
pub struct ListResponse {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<ListItem>,
}

/// A list item; `display_title` reads `"Artist - Title"`
#[derive(Debug, Clone, Deserialize)]
pub struct ListItem {
    pub id: u64,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub display_title: String,
}
