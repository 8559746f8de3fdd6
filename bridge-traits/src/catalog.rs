//! Catalog Port
//!
//! Abstracts the music-catalog service a playlist is imported from. A
//! catalog exposes three resource kinds: a user's collection, a user's
//! wantlist, and a curated list.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A raw catalog record: a title and its credited artists in billing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    pub artists: Vec<String>,
}

impl CatalogEntry {
    pub fn new(title: impl Into<String>, artists: Vec<String>) -> Self {
        Self {
            title: title.into(),
            artists,
        }
    }

    /// Build an entry from an `"Artist - Title"` display string.
    ///
    /// Splits on the first `" - "`; the artist half becomes a single artist.
    /// Without a separator the whole string is the title and the artist list
    /// is empty.
    pub fn from_display_title(display: &str) -> Self {
        match display.split_once(" - ") {
            Some((artist, title)) => Self::new(title, vec![artist.to_string()]),
            None => Self::new(display, Vec::new()),
        }
    }
}

/// One page of a paginated catalog resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPage {
    /// Entries in the remote's order
    pub entries: Vec<CatalogEntry>,
    /// URL of the next page, if the envelope carries one
    pub next_page: Option<String>,
}

impl CatalogPage {
    pub fn new(entries: Vec<CatalogEntry>, next_page: Option<String>) -> Self {
        Self { entries, next_page }
    }

    /// Cursor to hand back for the following page, treating an empty URL as
    /// the end of the sequence.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_page.as_deref().filter(|url| !url.is_empty())
    }
}

/// Catalog service trait
///
/// Collection and wantlist are cursor-paginated: pass `None` for the first
/// page and the previous page's [`CatalogPage::next_page`] afterwards. Lists
/// are returned whole.
///
/// Implementations report `401` as [`BridgeError::Unauthorized`](crate::error::BridgeError::Unauthorized)
/// (private or inaccessible resource) and must not retry it.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one page of a user's collection.
    async fn collection_page(&self, user: &str, cursor: Option<String>) -> Result<CatalogPage>;

    /// Fetch one page of a user's wantlist.
    async fn wantlist_page(&self, user: &str, cursor: Option<String>) -> Result<CatalogPage>;

    /// Fetch every entry of a curated list.
    async fn list_entries(&self, list_id: &str) -> Result<Vec<CatalogEntry>>;
}
