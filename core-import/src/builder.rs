//! # Batched Playlist Builder
//!
//! Turns album ids into a populated playlist in three sequential phases:
//!
//! 1. expand albums into track URIs, [`MAX_ALBUMS_PER_LOOKUP`] albums per call
//! 2. create the playlist (exactly once)
//! 3. append the URIs, [`MAX_TRACKS_PER_WRITE`] per call
//!
//! Expansion runs before creation so a failing lookup never leaves an empty
//! playlist behind. A failed write is not rolled back: the playlist keeps
//! every batch written before the failure.

use bridge_traits::{
    AlbumId, PlaylistWriter, TrackUri, MAX_ALBUMS_PER_LOOKUP, MAX_TRACKS_PER_WRITE,
};
use core_async::sync::CancellationToken;
use core_runtime::events::{EventBus, ImportEvent};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::error::{ImportError, Result};
use crate::pipeline::publish;

/// Split `items` into consecutive chunks of at most `size`.
///
/// Only the last chunk may be shorter. Empty input yields no chunks.
pub fn batches<T>(items: &[T], size: usize) -> Vec<&[T]> {
    items.chunks(size.max(1)).collect()
}

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub url: String,
    pub track_count: usize,
    /// Track lookup calls made
    pub album_batches: usize,
    /// Playlist write calls made
    pub write_batches: usize,
}

/// Playlist builder over a [`PlaylistWriter`] port.
#[derive(Clone)]
pub struct PlaylistBuilder {
    writer: Arc<dyn PlaylistWriter>,
    events: Option<EventBus>,
}

impl PlaylistBuilder {
    pub fn new(writer: Arc<dyn PlaylistWriter>) -> Self {
        Self {
            writer,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Build a playlist named `name` from `album_ids`.
    ///
    /// Batches within a phase run strictly one after another. Cancellation is
    /// observed between batches.
    ///
    /// # Errors
    ///
    /// The first failing call, converted with
    /// [`ImportError::from_streaming`], or [`ImportError::Cancelled`].
    #[instrument(skip(self, description, album_ids, cancel), fields(albums = album_ids.len()))]
    pub async fn build(
        &self,
        name: &str,
        description: &str,
        album_ids: &[AlbumId],
        cancel: &CancellationToken,
    ) -> Result<PlaylistSummary> {
        let album_batches = batches(album_ids, MAX_ALBUMS_PER_LOOKUP);
        let mut uris: Vec<TrackUri> = Vec::new();

        for (batch, ids) in album_batches.iter().enumerate() {
            check_cancelled(cancel)?;
            let tracks = self
                .writer
                .album_track_uris(ids)
                .await
                .map_err(ImportError::from_streaming)?;
            debug!(batch, albums = ids.len(), tracks = tracks.len(), "Expanded albums");
            uris.extend(tracks);
        }

        check_cancelled(cancel)?;
        let playlist = self
            .writer
            .create_playlist(name, description)
            .await
            .map_err(ImportError::from_streaming)?;
        info!(playlist_id = %playlist.id, "Playlist created");
        publish(
            self.events.as_ref(),
            ImportEvent::PlaylistCreated {
                playlist_id: playlist.id.clone(),
            },
        );

        let write_batches = batches(&uris, MAX_TRACKS_PER_WRITE);
        for (batch, chunk) in write_batches.iter().enumerate() {
            check_cancelled(cancel)?;
            self.writer
                .add_tracks(&playlist.id, chunk)
                .await
                .map_err(ImportError::from_streaming)?;
            debug!(batch, count = chunk.len(), "Tracks written");
            publish(
                self.events.as_ref(),
                ImportEvent::TracksAdded {
                    batch,
                    count: chunk.len(),
                },
            );
        }

        Ok(PlaylistSummary {
            id: playlist.id,
            url: playlist.url,
            track_count: uris.len(),
            album_batches: album_batches.len(),
            write_batches: write_batches.len(),
        })
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(ImportError::Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batches_exact_multiple() {
        let items: Vec<u32> = (0..40).collect();
        let chunks = batches(&items, 20);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.len() == 20));
    }

    #[test]
    fn test_batches_short_tail() {
        let items: Vec<u32> = (0..205).collect();
        let chunks = batches(&items, 100);
        assert_eq!(
            chunks.iter().map(|c| c.len()).collect::<Vec<_>>(),
            vec![100, 100, 5]
        );
    }

    #[test]
    fn test_batches_empty_input_yields_nothing() {
        let items: Vec<u32> = Vec::new();
        assert!(batches(&items, 20).is_empty());
    }

    #[test]
    fn test_batches_concatenate_to_original() {
        for n in [0usize, 1, 19, 20, 21, 99, 100, 101, 250] {
            for size in [1usize, 20, 100] {
                let items: Vec<usize> = (0..n).collect();
                let chunks = batches(&items, size);

                assert_eq!(chunks.len(), n.div_ceil(size));
                assert!(chunks.iter().rev().skip(1).all(|c| c.len() == size));
                assert_eq!(chunks.concat(), items);
            }
        }
    }
}
