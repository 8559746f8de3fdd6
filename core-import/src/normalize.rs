//! Entry normalization: catalog record to search key.

use bridge_traits::{CatalogEntry, SearchKey};

/// Separator between credited artists in a search key.
pub const ARTIST_SEPARATOR: &str = ", ";

/// Map a catalog entry to the minimal key used for album search.
///
/// Artists are joined in billing order; an empty artist list yields an
/// empty artist string. The title is trimmed. Never fails: an unusable key
/// simply finds nothing.
pub fn normalize(entry: &CatalogEntry) -> SearchKey {
    SearchKey::new(entry.artists.join(ARTIST_SEPARATOR), entry.title.trim())
}

pub fn normalize_all(entries: &[CatalogEntry]) -> Vec<SearchKey> {
    entries.iter().map(normalize).collect()
}
