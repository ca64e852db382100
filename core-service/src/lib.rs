//! Player service façade and bootstrap helpers.
//!
//! This crate wires a host-provided [`AudioEngine`] implementation into the
//! player core: it owns the controller behind a mutex, pumps engine events
//! back into the controller's single dispatch path, and ties the position
//! poller's lifecycle to playback sessions. Host applications construct one
//! [`PlayerService`] at startup and share it with their UI layer: there is
//! exactly one device audio output, so there is exactly one service per app
//! session.
//!
//! ```ignore
//! use core_service::PlayerService;
//! use core_player::PlayerConfig;
//!
//! let service = PlayerService::builder()
//!     .audio_engine(Box::new(MyWebAudioEngine::new()))
//!     .config(PlayerConfig::default())
//!     .build()?;
//!
//! let mut events = service.subscribe();
//! service.play_queue(tracks, 0);
//! ```
//!
//! The builder fails fast with an actionable [`CoreError::CapabilityMissing`]
//! when the host forgets to inject an engine; there is no ambient default.

pub mod error;

pub use error::{CoreError, Result};

use bridge_traits::audio::{AudioEngine, EngineEvent, EngineEventSink};
use core_player::{
    PlaybackState, PlayerConfig, PlayerController, PositionPoller, SeekDragState, TrackDescriptor,
};
use core_runtime::events::{CoreEvent, EventBus, EventStream, Receiver};

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Primary façade exposed to host applications.
///
/// Cheap to clone; all clones share the same controller, event bus, and
/// poller. Must be constructed from within a tokio runtime (the engine event
/// pump and poller are spawned tasks).
#[derive(Clone)]
pub struct PlayerService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    controller: Arc<Mutex<PlayerController>>,
    events: EventBus,
    seek_drag: SeekDragState,
    poller: Arc<Mutex<Option<PositionPoller>>>,
    config: PlayerConfig,
    pump: JoinHandle<()>,
}

impl Drop for ServiceInner {
    fn drop(&mut self) {
        self.pump.abort();
        self.poller.lock().take();
    }
}

impl PlayerService {
    /// Start building a service.
    pub fn builder() -> PlayerServiceBuilder {
        PlayerServiceBuilder::default()
    }

    // ========================================================================
    // Transport commands (delegated to the controller)
    // ========================================================================

    /// Play a single track as a one-element queue.
    pub fn play_single(&self, track: TrackDescriptor) {
        self.inner.controller.lock().play_single(track);
        self.sync_poller();
    }

    /// Replace the queue and start playback at `start_index`. Empty or
    /// out-of-range input is a silent no-op.
    pub fn play_queue(&self, tracks: Vec<TrackDescriptor>, start_index: usize) {
        self.inner.controller.lock().play_queue(tracks, start_index);
        self.sync_poller();
    }

    /// Pause when playing, resume when paused.
    pub fn toggle_play_pause(&self) {
        self.inner.controller.lock().toggle_play_pause();
    }

    /// Advance to the next queue entry (no-op at the tail).
    pub fn next(&self) {
        self.inner.controller.lock().next();
        self.sync_poller();
    }

    /// Smart rewind / previous queue entry.
    pub fn previous(&self) {
        self.inner.controller.lock().previous();
        self.sync_poller();
    }

    /// Store and apply volume (`0.0..=1.0`, caller clamps).
    pub fn set_volume(&self, volume: f32) {
        self.inner.controller.lock().set_volume(volume);
    }

    /// Seek the live session; ignored when nothing is loaded or ready.
    pub fn seek(&self, position: Duration) {
        self.inner.controller.lock().seek(position);
    }

    // ========================================================================
    // Seek drag (poller suspension)
    // ========================================================================

    /// The UI started dragging a seek control; progress publication pauses.
    pub fn begin_seek_drag(&self) {
        self.inner.seek_drag.begin();
    }

    /// The UI released the seek control; progress publication resumes after
    /// the configured settle delay.
    pub fn end_seek_drag(&self) {
        self.inner.seek_drag.release(self.inner.config.seek_drag_settle);
    }

    /// Whether a seek drag is currently suppressing progress publication.
    pub fn is_seek_dragging(&self) -> bool {
        self.inner.seek_drag.is_dragging()
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Snapshot of the current playback state.
    pub fn state(&self) -> PlaybackState {
        self.inner.controller.lock().state()
    }

    /// Subscribe to all core events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.inner.events.subscribe()
    }

    /// Subscribe with a filter, e.g. progress samples only.
    pub fn event_stream(&self) -> EventStream {
        EventStream::new(self.inner.events.subscribe())
    }

    /// The shared event bus.
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Whether the position poller is currently running.
    pub fn is_polling(&self) -> bool {
        self.inner
            .poller
            .lock()
            .as_ref()
            .map(|p| !p.is_stopped())
            .unwrap_or(false)
    }

    // ========================================================================
    // Poller lifecycle
    // ========================================================================

    /// Start the poller when a session is live, stop it when none is.
    ///
    /// Called after every command and after every pumped engine event, so the
    /// poller lifecycle tracks session lifecycle without the controller
    /// knowing the poller exists.
    fn sync_poller(&self) {
        Self::sync_poller_inner(
            &self.inner.controller,
            &self.inner.poller,
            &self.inner.seek_drag,
            &self.inner.events,
            self.inner.config.progress_interval,
        );
    }

    fn sync_poller_inner(
        controller: &Arc<Mutex<PlayerController>>,
        poller: &Arc<Mutex<Option<PositionPoller>>>,
        seek_drag: &SeekDragState,
        events: &EventBus,
        interval: Duration,
    ) {
        let live = controller.lock().has_session();
        let mut slot = poller.lock();
        match (live, slot.is_some()) {
            (true, false) => {
                debug!("session live; starting position poller");
                *slot = Some(PositionPoller::spawn(
                    Arc::clone(controller),
                    seek_drag.clone(),
                    events.clone(),
                    interval,
                ));
            }
            (false, true) => {
                debug!("no live session; stopping position poller");
                slot.take();
            }
            _ => {}
        }
    }
}

/// Builder for [`PlayerService`] with fail-fast capability validation.
#[derive(Default)]
pub struct PlayerServiceBuilder {
    engine: Option<Box<dyn AudioEngine>>,
    config: Option<PlayerConfig>,
}

impl PlayerServiceBuilder {
    /// Inject the host's audio engine implementation (required).
    pub fn audio_engine(mut self, engine: Box<dyn AudioEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Override the player configuration (defaults apply otherwise).
    pub fn config(mut self, config: PlayerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Validate, wire, and start the service.
    ///
    /// Spawns the engine event pump; must be called from within a tokio
    /// runtime.
    pub fn build(self) -> Result<PlayerService> {
        let engine = self.engine.ok_or_else(|| CoreError::CapabilityMissing {
            capability: "AudioEngine".to_string(),
            message: "No audio engine implementation provided. \
                      Web: inject the HTML5 audio adapter. \
                      Desktop: inject the native media engine adapter."
                .to_string(),
        })?;
        let config = self.config.unwrap_or_default();

        let events = EventBus::new(config.event_buffer_size);
        let seek_drag = SeekDragState::new();

        // Engine events funnel through one channel into the controller's
        // single dispatch path; the sink side is what engines clone per
        // handle.
        let (engine_tx, mut engine_rx) = mpsc::unbounded_channel::<EngineEvent>();
        let sink = EngineEventSink::new(move |event| {
            engine_tx.send(event).ok();
        });

        let controller = Arc::new(Mutex::new(PlayerController::new(
            engine,
            sink,
            events.clone(),
            &config,
        )));
        let poller: Arc<Mutex<Option<PositionPoller>>> = Arc::new(Mutex::new(None));

        let pump = {
            let controller = Arc::clone(&controller);
            let poller = Arc::clone(&poller);
            let seek_drag = seek_drag.clone();
            let events = events.clone();
            let interval = config.progress_interval;
            tokio::spawn(async move {
                while let Some(event) = engine_rx.recv().await {
                    controller.lock().handle_engine_event(event);
                    // Auto-advance and queue exhaustion change session
                    // liveness without a user command.
                    PlayerService::sync_poller_inner(
                        &controller,
                        &poller,
                        &seek_drag,
                        &events,
                        interval,
                    );
                }
            })
        };

        Ok(PlayerService {
            inner: Arc::new(ServiceInner {
                controller,
                events,
                seek_drag,
                poller,
                config,
                pump,
            }),
        })
    }
}
