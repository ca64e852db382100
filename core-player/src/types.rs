//! Value types shared between the player controller and host UIs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable description of one playable item.
///
/// Descriptors are produced by whatever API layer the host runs (REST
/// responses, library queries) and handed to the controller by reference; the
/// controller never mutates one. `media_uri` must arrive fully resolved: the
/// core performs no relative-to-absolute URL normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    /// Opaque unique identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Display artist string.
    pub artist: String,
    /// Pre-resolved URI of the playable media.
    pub media_uri: String,
    /// Optional pre-resolved artwork URI.
    pub artwork_uri: Option<String>,
    /// Duration reported by the catalog, when known. Display hint only; the
    /// engine's own duration wins once the media is loaded.
    pub duration_hint: Option<Duration>,
}

impl TrackDescriptor {
    /// Create a descriptor with the required fields.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        media_uri: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            media_uri: media_uri.into(),
            artwork_uri: None,
            duration_hint: None,
        }
    }

    /// Attach an artwork URI.
    pub fn with_artwork_uri(mut self, uri: impl Into<String>) -> Self {
        self.artwork_uri = Some(uri.into());
        self
    }

    /// Attach a catalog duration hint.
    pub fn with_duration_hint(mut self, duration: Duration) -> Self {
        self.duration_hint = Some(duration);
        self
    }
}

/// Read-only projection of the controller state for host UIs.
///
/// UIs never mutate this directly; every change goes through a controller
/// command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    /// The track at the current queue position, if any.
    pub current_track: Option<TrackDescriptor>,
    /// Whether the controller considers playback active. Set optimistically
    /// while a load is still in flight.
    pub is_playing: bool,
    /// Stored volume in `0.0..=1.0`.
    pub volume: f32,
    /// Snapshot of the play queue.
    pub queue: Vec<TrackDescriptor>,
    /// Current queue index, `None` when the queue is empty.
    pub current_index: Option<usize>,
}

/// The polled position/duration pair published for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaybackProgress {
    /// Current playback position.
    pub position: Duration,
    /// Total media duration, when the engine knows it.
    pub duration: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_builder() {
        let track = TrackDescriptor::new("t1", "Title", "Artist", "https://m.example.com/t1.mp3")
            .with_artwork_uri("https://m.example.com/t1.jpg")
            .with_duration_hint(Duration::from_secs(180));

        assert_eq!(track.id, "t1");
        assert_eq!(track.artwork_uri.as_deref(), Some("https://m.example.com/t1.jpg"));
        assert_eq!(track.duration_hint, Some(Duration::from_secs(180)));
    }
}
