//! The playback controller: sole authority over what is playing, queue
//! order/position, and volume.
//!
//! ## Command model
//!
//! All mutations happen through synchronous commands on one
//! `PlayerController`, either issued by the host UI or dispatched from engine
//! events via [`handle_engine_event`](PlayerController::handle_engine_event).
//! Hosts serialize the two paths behind a mutex (see `core-service`), which
//! gives every command run-to-completion semantics: two commands can never
//! interleave mid-mutation.
//!
//! Engine failures never escape a command as an error or panic. They are
//! logged, published as [`PlayerEvent::Error`], and leave the controller in a
//! well-defined stopped state for the affected track.
//!
//! ## Sessions and stale events
//!
//! Starting any track creates a fresh [`PlaybackSession`] and releases the
//! previous engine handle: supersession is the only cancellation mechanism.
//! Engine events carry the handle they were registered under; an event whose
//! handle does not match the live session is discarded, so a slow load
//! completing after the user has moved on can never resurrect a torn-down
//! source.
//!
//! ## End-of-queue policy
//!
//! When the last queue entry finishes naturally the controller sets
//! `is_playing = false`, keeps `current_track` pointing at that last entry,
//! and releases the engine handle. [`PlayerEvent::QueueEnded`] tells hosts
//! apart from a user pause.

use crate::config::PlayerConfig;
use crate::queue::TrackQueue;
use crate::session::{PlaybackSession, SessionId};
use crate::types::{PlaybackProgress, PlaybackState};
use crate::TrackDescriptor;

use bridge_traits::audio::{AudioEngine, EngineEvent, EngineEventKind, EngineEventSink, EngineHandle};
use core_runtime::events::{CoreEvent, EventBus, PlayerEvent};
use core_runtime::logging::strip_path;

use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// What an accepted engine event asks the controller to do, decided while the
/// live session is borrowed and executed after the borrow ends.
enum EventAction {
    Discard,
    TrackFinished,
    LoadFailed { message: String },
    PlayFailedArmed { message: String },
    PlayFailedFinal { message: String },
    Replay { handle: EngineHandle },
}

/// Client-side playback controller owning the queue, the live engine session,
/// and the transport state.
pub struct PlayerController {
    engine: Box<dyn AudioEngine>,
    queue: TrackQueue,
    session: Option<PlaybackSession>,
    is_playing: bool,
    volume: f32,
    next_generation: u64,
    engine_events: EngineEventSink,
    events: EventBus,
    rewind_threshold: Duration,
}

impl PlayerController {
    /// Create a controller over the given engine.
    ///
    /// `engine_events` is the sink the engine will deliver per-handle events
    /// into; the host wiring (see `core-service`) routes those back to
    /// [`handle_engine_event`](Self::handle_engine_event). `events` is the bus
    /// state changes are published on.
    pub fn new(
        engine: Box<dyn AudioEngine>,
        engine_events: EngineEventSink,
        events: EventBus,
        config: &PlayerConfig,
    ) -> Self {
        Self {
            engine,
            queue: TrackQueue::empty(),
            session: None,
            is_playing: false,
            volume: config.initial_volume,
            next_generation: 0,
            engine_events,
            events,
            rewind_threshold: config.rewind_threshold,
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Play a single track as a one-element queue.
    pub fn play_single(&mut self, track: TrackDescriptor) {
        self.queue = TrackQueue::single(track);
        if self.start_current() {
            self.emit_started();
        }
    }

    /// Replace the queue and start playback at `start_index`.
    ///
    /// An empty `tracks` list or an out-of-range `start_index` is a silent
    /// no-op: state is left exactly as it was. Callers that want a
    /// user-visible message must check before issuing the command.
    pub fn play_queue(&mut self, tracks: Vec<TrackDescriptor>, start_index: usize) {
        let Some(queue) = TrackQueue::new(tracks, start_index) else {
            debug!(start_index, "play_queue with empty or out-of-range input; ignoring");
            return;
        };
        self.queue = queue;
        if self.start_current() {
            self.emit_started();
        }
    }

    /// Pause when playing, resume when paused. No-op when nothing is loaded.
    ///
    /// Never replaces the session: toggling twice from a stable playing state
    /// ends on the same engine handle it started with.
    pub fn toggle_play_pause(&mut self) {
        let Some(handle) = self.session.as_ref().map(|s| s.handle) else {
            debug!("toggle_play_pause with no session; ignoring");
            return;
        };
        let position_ms = duration_ms(self.engine.position(handle).unwrap_or_default());
        let Some(track_id) = self.queue.current().map(|t| t.id.clone()) else {
            return;
        };

        if self.is_playing {
            if let Err(err) = self.engine.pause(handle) {
                warn!(error = %err, "engine pause failed");
            }
            self.is_playing = false;
            self.emit(PlayerEvent::Paused {
                track_id,
                position_ms,
            });
        } else {
            if let Err(err) = self.engine.play(handle) {
                warn!(error = %err, "engine resume failed");
            }
            self.is_playing = true;
            self.emit(PlayerEvent::Resumed {
                track_id,
                position_ms,
            });
        }
    }

    /// Advance to the next queue entry.
    ///
    /// At the last entry this does nothing: it neither stops playback nor
    /// wraps around. Only natural end-of-track completion terminates a queue
    /// traversal.
    pub fn next(&mut self) {
        if !self.queue.advance() {
            debug!("next at queue tail; ignoring");
            return;
        }
        if self.start_current() {
            self.emit_track_changed();
        }
    }

    /// Smart rewind: restart the current track when more than the rewind
    /// threshold (3 seconds) has played, otherwise move to the previous queue
    /// entry. At the queue head with nothing meaningful played, does nothing.
    pub fn previous(&mut self) {
        let position = self
            .session
            .as_ref()
            .and_then(|s| self.engine.position(s.handle))
            .unwrap_or(Duration::ZERO);

        if position > self.rewind_threshold {
            // Restart the current track; the queue position stays put.
            if let Some(handle) = self.session.as_ref().map(|s| s.handle) {
                debug!(position_ms = duration_ms(position), "previous: restarting current track");
                if let Err(err) = self.engine.seek(handle, Duration::ZERO) {
                    warn!(error = %err, "engine seek to start failed");
                }
            }
        } else if self.queue.retreat() {
            if self.start_current() {
                self.emit_track_changed();
            }
        } else {
            debug!("previous at queue head; ignoring");
        }
    }

    /// Store `volume` and apply it to the live session, if any.
    ///
    /// Expected range is `0.0..=1.0`; clamping is the caller's
    /// responsibility. The stored value is inherited by every later session
    /// even when none is live right now.
    pub fn set_volume(&mut self, volume: f32) {
        if let Some(handle) = self.session.as_ref().map(|s| s.handle) {
            if let Err(err) = self.engine.set_volume(handle, volume) {
                warn!(error = %err, "engine set_volume failed");
            }
        }
        self.volume = volume;
        self.emit(PlayerEvent::VolumeChanged {
            volume_percent: (volume.clamp(0.0, 1.0) * 100.0).round() as u8,
        });
    }

    /// Seek the live session to `position`.
    ///
    /// Ignored (silently) when no session exists or the engine has not
    /// finished loading: seeking a source mid-load is undefined on some
    /// backends and must not be attempted.
    pub fn seek(&mut self, position: Duration) {
        let Some(handle) = self.session.as_ref().map(|s| s.handle) else {
            trace!("seek with no session; ignoring");
            return;
        };
        if !self.engine.is_ready(handle) {
            trace!("seek before engine ready; ignoring");
            return;
        }
        if let Err(err) = self.engine.seek(handle, position) {
            warn!(error = %err, "engine seek failed");
        }
    }

    // ========================================================================
    // Engine event dispatch
    // ========================================================================

    /// Dispatch one asynchronous engine event into the controller.
    ///
    /// This is the single mutation path for everything the engine reports:
    /// natural completion (auto-advance), load failures, playback refusals
    /// and the unlock signal. Events whose handle does not match the live
    /// session are discarded.
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        let action = match self.session.as_mut() {
            None => {
                trace!(handle = %event.handle, "engine event with no live session; discarding");
                EventAction::Discard
            }
            Some(session) if session.handle != event.handle => {
                trace!(
                    handle = %event.handle,
                    live = %session.id,
                    "stale engine event from a superseded session; discarding"
                );
                EventAction::Discard
            }
            Some(session) => match event.kind {
                EngineEventKind::Finished => EventAction::TrackFinished,
                EngineEventKind::LoadFailed { message } => EventAction::LoadFailed { message },
                EngineEventKind::PlaybackFailed { message } => {
                    if session.arm_unlock_replay() {
                        EventAction::PlayFailedArmed { message }
                    } else {
                        EventAction::PlayFailedFinal { message }
                    }
                }
                EngineEventKind::Unlocked => {
                    if session.take_unlock_replay() {
                        EventAction::Replay {
                            handle: session.handle,
                        }
                    } else {
                        EventAction::Discard
                    }
                }
            },
        };

        match action {
            EventAction::Discard => {}
            EventAction::TrackFinished => self.on_track_finished(),
            EventAction::LoadFailed { message } => {
                let track_id = self.queue.current().map(|t| t.id.clone());
                warn!(track_id = track_id.as_deref().unwrap_or("-"), %message, "media load failed");
                // No retry and no skip-to-next: a broken track stays current,
                // stopped, until the user moves on.
                self.is_playing = false;
                self.emit(PlayerEvent::Error {
                    track_id,
                    message,
                    recoverable: false,
                });
            }
            EventAction::PlayFailedArmed { message } => {
                let track_id = self.queue.current().map(|t| t.id.clone());
                warn!(
                    track_id = track_id.as_deref().unwrap_or("-"),
                    %message,
                    "playback refused; waiting for audio unlock to replay once"
                );
                self.emit(PlayerEvent::Error {
                    track_id,
                    message,
                    recoverable: true,
                });
            }
            EventAction::PlayFailedFinal { message } => {
                let track_id = self.queue.current().map(|t| t.id.clone());
                warn!(
                    track_id = track_id.as_deref().unwrap_or("-"),
                    %message,
                    "playback failed after unlock replay; giving up"
                );
                self.is_playing = false;
                self.emit(PlayerEvent::Error {
                    track_id,
                    message,
                    recoverable: false,
                });
            }
            EventAction::Replay { handle } => {
                info!("audio output unlocked; replaying");
                if let Err(err) = self.engine.play(handle) {
                    warn!(error = %err, "unlock replay failed");
                }
            }
        }
    }

    /// Natural end of the current track: advance like `next()`, or apply the
    /// end-of-queue policy at the tail.
    fn on_track_finished(&mut self) {
        let Some(track_id) = self.queue.current().map(|t| t.id.clone()) else {
            return;
        };
        self.emit(PlayerEvent::Completed {
            track_id: track_id.clone(),
        });

        if self.queue.advance() {
            if self.start_current() {
                self.emit_track_changed();
            }
        } else {
            info!(track_id = %track_id, "queue exhausted; stopping");
            self.teardown_session();
            self.is_playing = false;
            self.emit(PlayerEvent::QueueEnded { track_id });
        }
    }

    // ========================================================================
    // State projection
    // ========================================================================

    /// Snapshot of the controller state for host UIs.
    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            current_track: self.queue.current().cloned(),
            is_playing: self.is_playing,
            volume: self.volume,
            queue: self.queue.tracks().to_vec(),
            current_index: self.queue.current_index(),
        }
    }

    /// The track at the current queue position, if any.
    pub fn current_track(&self) -> Option<&TrackDescriptor> {
        self.queue.current()
    }

    /// Whether the controller considers playback active.
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// The stored volume.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Whether a session is live.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Read the live session's position/duration pair, tagged with the
    /// current track id. Read-side only: the position poller calls this every
    /// tick and must never mutate controller state.
    ///
    /// Returns `None` when no session is live (the poller goes quiet rather
    /// than erroring when a teardown races a poll tick).
    pub fn progress_sample(&self) -> Option<(String, PlaybackProgress)> {
        let session = self.session.as_ref()?;
        let track = self.queue.current()?;
        Some((
            track.id.clone(),
            PlaybackProgress {
                position: self.engine.position(session.handle).unwrap_or_default(),
                duration: self.engine.duration(session.handle),
            },
        ))
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Tear down any live session and start the track at the current queue
    /// position. Returns `true` when a new session began loading.
    ///
    /// `is_playing` turns true optimistically here: the UI shows "attempting
    /// to play" while the load is still in flight.
    fn start_current(&mut self) -> bool {
        let Some(track) = self.queue.current().cloned() else {
            return false;
        };
        self.teardown_session();

        let id = SessionId::new(self.next_generation);
        self.next_generation += 1;

        debug!(
            %id,
            track_id = %track.id,
            media = %strip_path(&track.media_uri),
            "starting playback session"
        );

        let handle = match self.engine.load(&track.media_uri, self.engine_events.clone()) {
            Ok(handle) => handle,
            Err(err) => {
                warn!(%id, track_id = %track.id, error = %err, "engine refused to load media");
                self.is_playing = false;
                self.emit(PlayerEvent::Error {
                    track_id: Some(track.id),
                    message: err.to_string(),
                    recoverable: false,
                });
                return false;
            }
        };

        // Volume first so the opening frames already honor the stored level.
        if let Err(err) = self.engine.set_volume(handle, self.volume) {
            warn!(%id, error = %err, "failed to apply volume to new session");
        }
        if let Err(err) = self.engine.play(handle) {
            warn!(%id, error = %err, "engine play failed at session start");
        }

        self.session = Some(PlaybackSession::new(id, handle));
        self.is_playing = true;
        true
    }

    /// Release the live engine handle, if any. Called on supersession and on
    /// queue exhaustion; `release` happens exactly once per handle.
    fn teardown_session(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(id = %session.id, handle = %session.handle, "releasing playback session");
            self.engine.release(session.handle);
        }
    }

    // ========================================================================
    // Event helpers
    // ========================================================================

    fn emit(&self, event: PlayerEvent) {
        // emit errors only mean "no subscribers right now"
        self.events.emit(CoreEvent::Player(event)).ok();
    }

    fn emit_started(&self) {
        if let Some(track) = self.queue.current() {
            self.emit(PlayerEvent::Started {
                track_id: track.id.clone(),
                title: track.title.clone(),
            });
        }
    }

    fn emit_track_changed(&self) {
        if let (Some(track), Some(index)) = (self.queue.current(), self.queue.current_index()) {
            self.emit(PlayerEvent::TrackChanged {
                track_id: track.id.clone(),
                title: track.title.clone(),
                index,
            });
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis() as u64
}
