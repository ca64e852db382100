//! Audio engine bridge trait and supporting types.
//!
//! These abstractions let the player core drive a platform audio primitive
//! (HTML5 `<audio>` on the web, a native media engine on desktop) without
//! knowing how that primitive fetches, decodes, or outputs media. Host
//! applications provide a concrete implementation that satisfies their
//! platform constraints.
//!
//! The contract is command/event shaped: every method is a non-blocking
//! command that returns immediately, and everything that happens later
//! (the track finishing, a load or autoplay failure, the output being
//! unlocked by a user gesture) is delivered through the [`EngineEventSink`]
//! registered at load time.

use crate::{error::Result, platform::PlatformSendSync};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Opaque identifier for one loaded media source inside an [`AudioEngine`].
///
/// A handle is minted by [`AudioEngine::load`] and stays valid until
/// [`AudioEngine::release`] is called for it. Engines must never reuse a
/// handle value for a later load; the core relies on handle uniqueness to
/// discard events from sources it has already torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineHandle(u64);

impl EngineHandle {
    /// Construct a handle from a raw engine-assigned value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw handle value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine-handle-{}", self.0)
    }
}

/// Asynchronous notification from an [`AudioEngine`], tagged with the handle
/// it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineEvent {
    /// The handle this event was registered under.
    pub handle: EngineHandle,
    /// What happened.
    pub kind: EngineEventKind,
}

impl EngineEvent {
    /// Create a new event for the given handle.
    pub fn new(handle: EngineHandle, kind: EngineEventKind) -> Self {
        Self { handle, kind }
    }
}

/// The kinds of notification an engine can deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum EngineEventKind {
    /// The source played to its natural end.
    Finished,
    /// The source could not be fetched or decoded.
    LoadFailed {
        /// Human-readable failure description from the platform.
        message: String,
    },
    /// The engine refused to start playback, typically because the platform
    /// requires a user gesture before audio output (autoplay policy).
    PlaybackFailed {
        /// Human-readable failure description from the platform.
        message: String,
    },
    /// A user gesture unlocked audio output. Only meaningful after a
    /// `PlaybackFailed` notification on the same handle.
    Unlocked,
}

#[cfg(not(target_arch = "wasm32"))]
type SinkFn = dyn Fn(EngineEvent) + Send + Sync;

#[cfg(target_arch = "wasm32")]
type SinkFn = dyn Fn(EngineEvent);

/// Delivery channel for [`EngineEvent`]s, handed to the engine at load time.
///
/// This is the trait-object rendering of per-handle callback registration:
/// instead of `on_finished`/`on_load_error`/`on_play_error`/`on_unlocked`
/// setters, the engine receives one sink and emits typed events into it.
/// The sink is cheap to clone; engines may stash a copy per handle.
#[derive(Clone)]
pub struct EngineEventSink {
    inner: Arc<SinkFn>,
}

impl EngineEventSink {
    /// Wrap a delivery function.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new<F>(deliver: F) -> Self
    where
        F: Fn(EngineEvent) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(deliver),
        }
    }

    /// Wrap a delivery function.
    #[cfg(target_arch = "wasm32")]
    pub fn new<F>(deliver: F) -> Self
    where
        F: Fn(EngineEvent) + 'static,
    {
        Self {
            inner: Arc::new(deliver),
        }
    }

    /// Deliver an event to the consumer side of the sink.
    pub fn emit(&self, event: EngineEvent) {
        (self.inner)(event)
    }
}

impl fmt::Debug for EngineEventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineEventSink").finish_non_exhaustive()
    }
}

/// Trait for platform audio engines that own the single device audio output.
///
/// Exactly one loaded source should hold device output at a time; the core
/// guarantees it releases the previous handle before (or immediately after)
/// loading a new one, and engines must treat [`release`](Self::release) as
/// freeing all resources tied to the handle. `release` is called exactly once
/// per handle.
///
/// Media URIs arrive pre-resolved; the engine performs no URL normalization.
///
/// # Readiness
///
/// Loading is asynchronous. Until [`is_ready`](Self::is_ready) reports `true`
/// the engine may not have duration or position information, and
/// [`seek`](Self::seek) must not be issued: the core guards this, but
/// engines should also tolerate (ignore) a stray early seek rather than
/// misbehave.
pub trait AudioEngine: PlatformSendSync {
    /// Begin loading a media source, registering `events` as the delivery
    /// channel for everything that later happens to it. Returns the handle
    /// that all subsequent commands and events reference.
    ///
    /// A returned error means loading could not even start (e.g. the engine
    /// has been shut down). Fetch and decode failures after this call are
    /// reported asynchronously as [`EngineEventKind::LoadFailed`].
    fn load(&mut self, uri: &str, events: EngineEventSink) -> Result<EngineHandle>;

    /// Begin or resume playback of a loaded source.
    fn play(&mut self, handle: EngineHandle) -> Result<()>;

    /// Pause playback without releasing the source.
    fn pause(&mut self, handle: EngineHandle) -> Result<()>;

    /// Seek to an absolute position within the source. Callers must check
    /// [`is_ready`](Self::is_ready) first.
    fn seek(&mut self, handle: EngineHandle, position: Duration) -> Result<()>;

    /// Adjust output volume for the source. Volume is normalized to
    /// `0.0..=1.0`.
    fn set_volume(&mut self, handle: EngineHandle, volume: f32) -> Result<()>;

    /// Current playback position, or `None` when the handle is unknown or
    /// the source is not ready yet.
    fn position(&self, handle: EngineHandle) -> Option<Duration>;

    /// Total duration of the source, or `None` when unknown (still loading,
    /// or a live stream).
    fn duration(&self, handle: EngineHandle) -> Option<Duration>;

    /// Whether the source has finished loading and can be played and seeked.
    fn is_ready(&self, handle: EngineHandle) -> bool;

    /// Free all resources tied to the handle. Called exactly once per handle;
    /// the handle and any events still in flight for it are dead afterwards.
    fn release(&mut self, handle: EngineHandle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn sink_delivers_events() {
        let seen: Arc<Mutex<Vec<EngineEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            EngineEventSink::new(move |event| seen.lock().unwrap().push(event))
        };

        let handle = EngineHandle::new(7);
        sink.emit(EngineEvent::new(handle, EngineEventKind::Finished));
        sink.emit(EngineEvent::new(
            handle,
            EngineEventKind::PlaybackFailed {
                message: "autoplay blocked".into(),
            },
        ));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].handle, handle);
        assert_eq!(seen[0].kind, EngineEventKind::Finished);
    }

    #[test]
    fn handle_identity() {
        let a = EngineHandle::new(1);
        let b = EngineHandle::new(2);
        assert_ne!(a, b);
        assert_eq!(a, EngineHandle::new(a.as_u64()));
        assert_eq!(a.to_string(), "engine-handle-1");
    }

    #[test]
    fn event_kind_serializes_with_tag() {
        let event = EngineEvent::new(
            EngineHandle::new(3),
            EngineEventKind::LoadFailed {
                message: "404".into(),
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"LoadFailed\""));
    }
}
