//! Dedup/filter of resolved album ids.

use bridge_traits::AlbumId;
use std::collections::HashSet;

/// Drop unmatched entries and repeated ids, keeping first-seen order.
///
/// An empty id string counts as unmatched.
pub fn dedup_album_ids<I>(ids: I) -> Vec<AlbumId>
where
    I: IntoIterator<Item = Option<AlbumId>>,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .flatten()
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
