//! # Event Bus System
//!
//! Progress reporting for import runs over `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! - **ImportEvent**: one variant per pipeline milestone
//! - **EventBus**: broadcast channel the pipeline publishes to
//! - **EventStream**: receiver wrapper with an optional filter
//!
//! Publishing never blocks and never fails the pipeline: an emit with no
//! subscribers is simply dropped.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     emit      ┌───────────┐     subscribe    ┌────────────┐
//! │ImportPipeline├──────────────>│ EventBus  ├─────────────────>│ CLI / UI   │
//! └──────────────┘               │ (broadcast│                  └────────────┘
//!                                │  channel) ├─────────────────>┌────────────┐
//!                                └───────────┘                  │ Audit log  │
//!                                                               └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, EventStream, ImportEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut failures = EventStream::new(bus.subscribe())
//!     .filter(|event| matches!(event, ImportEvent::Failed { .. }));
//!
//! bus.emit(ImportEvent::CatalogFetched { entries: 12 }).ok();
//! bus.emit(ImportEvent::Failed {
//!     message: "No entries found".to_string(),
//!     kind: "empty_result".to_string(),
//! })
//! .ok();
//!
//! let event = failures.recv().await.unwrap();
//! assert_eq!(event.severity(), core_runtime::events::EventSeverity::Error);
//! # }
//! ```

use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Milestones of one import run, in the order they occur.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ImportEvent {
    /// The source URL was classified.
    Started {
        /// The URL as the user supplied it
        source: String,
        /// `collection`, `wantlist` or `list`
        kind: String,
    },
    /// Every catalog page has been fetched.
    CatalogFetched { entries: usize },
    /// Album lookups finished.
    AlbumsResolved {
        /// Distinct albums after dedup
        matched: usize,
        /// Entries with no streaming match
        not_found: usize,
        total: usize,
    },
    /// The destination playlist exists (still empty).
    PlaylistCreated { playlist_id: String },
    /// One write batch was appended.
    TracksAdded {
        /// Zero-based batch index
        batch: usize,
        count: usize,
    },
    Completed {
        playlist_id: String,
        source_entries: usize,
        matched_albums: usize,
    },
    Failed {
        message: String,
        /// Stable error tag, e.g. `catalog_unauthorized`
        kind: String,
    },
    Cancelled,
}

impl ImportEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            ImportEvent::Started { .. } => "Import started",
            ImportEvent::CatalogFetched { .. } => "Catalog fetched",
            ImportEvent::AlbumsResolved { .. } => "Albums resolved",
            ImportEvent::PlaylistCreated { .. } => "Playlist created",
            ImportEvent::TracksAdded { .. } => "Tracks added",
            ImportEvent::Completed { .. } => "Import completed",
            ImportEvent::Failed { .. } => "Import failed",
            ImportEvent::Cancelled => "Import cancelled",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            ImportEvent::Failed { .. } => EventSeverity::Error,
            ImportEvent::Cancelled => EventSeverity::Warning,
            ImportEvent::Started { .. } | ImportEvent::Completed { .. } => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }

    /// Whether no further events follow for this run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ImportEvent::Completed { .. } | ImportEvent::Failed { .. } | ImportEvent::Cancelled
        )
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Central broadcast channel for import events.
///
/// Cloning yields another handle to the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ImportEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// A subscriber that falls behind by more than `capacity` events receives
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are none.
    pub fn emit(&self, event: ImportEvent) -> Result<usize, SendError<ImportEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<ImportEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

type EventFilter = Box<dyn Fn(&ImportEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
pub struct EventStream {
    receiver: Receiver<ImportEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<ImportEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv()`/`try_recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ImportEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &ImportEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` if the subscriber fell behind by `n` events,
    /// `RecvError::Closed` once every bus handle has been dropped.
    pub async fn recv(&mut self) -> Result<ImportEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without waiting.
    ///
    /// Returns `None` if no matching event is currently buffered.
    pub fn try_recv(&mut self) -> Option<Result<ImportEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed() -> ImportEvent {
        ImportEvent::Completed {
            playlist_id: "pl-1".to_string(),
            source_entries: 2,
            matched_albums: 2,
        }
    }

    #[core_async::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);

        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[core_async::test]
    async fn test_emit_without_subscribers() {
        let bus = EventBus::default();
        assert!(bus.emit(ImportEvent::Cancelled).is_err());
    }

    #[core_async::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        assert_eq!(bus.emit(completed()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), completed());
        assert_eq!(sub2.recv().await.unwrap(), completed());
    }

    #[core_async::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe()).filter(ImportEvent::is_terminal);

        bus.emit(ImportEvent::CatalogFetched { entries: 3 }).ok();
        bus.emit(ImportEvent::TracksAdded { batch: 0, count: 100 }).ok();
        bus.emit(completed()).ok();

        assert_eq!(stream.recv().await.unwrap(), completed());
    }

    #[core_async::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for batch in 0..5 {
            bus.emit(ImportEvent::TracksAdded { batch, count: 100 }).ok();
        }

        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let failed = ImportEvent::Failed {
            message: "Catalog resource is private".to_string(),
            kind: "catalog_unauthorized".to_string(),
        };
        assert_eq!(failed.severity(), EventSeverity::Error);
        assert_eq!(ImportEvent::Cancelled.severity(), EventSeverity::Warning);
        assert_eq!(completed().severity(), EventSeverity::Info);
        assert_eq!(
            ImportEvent::CatalogFetched { entries: 1 }.severity(),
            EventSeverity::Debug
        );
        assert!(EventSeverity::Error > EventSeverity::Info);
    }

    #[test]
    fn test_event_serialization() {
        let event = ImportEvent::AlbumsResolved {
            matched: 8,
            not_found: 2,
            total: 10,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""event":"AlbumsResolved""#));

        let deserialized: ImportEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[core_async::test]
    async fn test_try_recv() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe());

        assert!(stream.try_recv().is_none());

        bus.emit(ImportEvent::PlaylistCreated {
            playlist_id: "pl-9".to_string(),
        })
        .ok();

        let received = stream.try_recv().unwrap().unwrap();
        assert_eq!(received.description(), "Playlist created");
    }
}
