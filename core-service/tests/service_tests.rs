//! End-to-end tests for the player service façade
//!
//! These drive the real wiring: a fake engine delivers events through the
//! sink it was handed at load time, the service pump dispatches them into the
//! controller, and the poller lifecycle follows session liveness.

use bridge_traits::audio::{
    AudioEngine, EngineEvent, EngineEventKind, EngineEventSink, EngineHandle,
};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use core_player::{PlayerConfig, TrackDescriptor};
use core_runtime::events::{CoreEvent, PlayerEvent};
use core_service::{CoreError, PlayerService};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Fake engine that reports through the real event sink
// ============================================================================

struct FakeSource {
    sink: EngineEventSink,
    position: Duration,
    volume: f32,
}

#[derive(Default)]
struct FakeEngineState {
    next_handle: u64,
    sources: HashMap<u64, FakeSource>,
    released: Vec<u64>,
}

#[derive(Clone, Default)]
struct FakeEngine {
    state: Arc<Mutex<FakeEngineState>>,
}

impl FakeEngine {
    fn shared(&self) -> Arc<Mutex<FakeEngineState>> {
        Arc::clone(&self.state)
    }

    /// Emit `Finished` for the live source through its registered sink, the
    /// way a platform engine reports natural end of playback.
    fn finish_current(&self) {
        let (handle, sink) = {
            let state = self.state.lock().unwrap();
            let (raw, source) = state
                .sources
                .iter()
                .max_by_key(|(raw, _)| **raw)
                .expect("no live source to finish");
            (EngineHandle::new(*raw), source.sink.clone())
        };
        sink.emit(EngineEvent::new(handle, EngineEventKind::Finished));
    }
}

impl AudioEngine for FakeEngine {
    fn load(&mut self, _uri: &str, events: EngineEventSink) -> BridgeResult<EngineHandle> {
        let mut state = self.state.lock().unwrap();
        state.next_handle += 1;
        let raw = state.next_handle;
        state.sources.insert(
            raw,
            FakeSource {
                sink: events,
                position: Duration::ZERO,
                volume: 1.0,
            },
        );
        Ok(EngineHandle::new(raw))
    }

    fn play(&mut self, _handle: EngineHandle) -> BridgeResult<()> {
        Ok(())
    }

    fn pause(&mut self, _handle: EngineHandle) -> BridgeResult<()> {
        Ok(())
    }

    fn seek(&mut self, handle: EngineHandle, position: Duration) -> BridgeResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.sources.get_mut(&handle.as_u64()) {
            Some(source) => {
                source.position = position;
                Ok(())
            }
            None => Err(BridgeError::UnknownHandle(handle.to_string())),
        }
    }

    fn set_volume(&mut self, handle: EngineHandle, volume: f32) -> BridgeResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(source) = state.sources.get_mut(&handle.as_u64()) {
            source.volume = volume;
        }
        Ok(())
    }

    fn position(&self, handle: EngineHandle) -> Option<Duration> {
        let state = self.state.lock().unwrap();
        state.sources.get(&handle.as_u64()).map(|s| s.position)
    }

    fn duration(&self, handle: EngineHandle) -> Option<Duration> {
        let state = self.state.lock().unwrap();
        state
            .sources
            .contains_key(&handle.as_u64())
            .then(|| Duration::from_secs(120))
    }

    fn is_ready(&self, handle: EngineHandle) -> bool {
        self.state
            .lock()
            .unwrap()
            .sources
            .contains_key(&handle.as_u64())
    }

    fn release(&mut self, handle: EngineHandle) {
        let mut state = self.state.lock().unwrap();
        state.sources.remove(&handle.as_u64());
        state.released.push(handle.as_u64());
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn make_tracks(ids: &[&str]) -> Vec<TrackDescriptor> {
    ids.iter()
        .map(|id| {
            TrackDescriptor::new(
                *id,
                format!("Title {id}"),
                "Artist",
                format!("https://media.example.com/{id}.mp3"),
            )
        })
        .collect()
}

fn build_service() -> (PlayerService, FakeEngine) {
    let engine = FakeEngine::default();
    let service = PlayerService::builder()
        .audio_engine(Box::new(engine.clone()))
        .config(PlayerConfig::default())
        .build()
        .expect("service should build with an engine injected");
    (service, engine)
}

/// Poll `condition` until it holds or a second elapses.
async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within timeout");
}

// ============================================================================
// Builder validation
// ============================================================================

#[test]
fn builder_without_engine_fails_fast() {
    let err = PlayerService::builder()
        .build()
        .err()
        .expect("build without an engine must fail");
    match err {
        CoreError::CapabilityMissing { capability, .. } => {
            assert_eq!(capability, "AudioEngine");
        }
        other => panic!("expected CapabilityMissing, got {other:?}"),
    }
}

// ============================================================================
// End-to-end playback flow
// ============================================================================

#[tokio::test]
async fn play_queue_runs_poller_and_auto_advances() {
    let (service, engine) = build_service();
    let mut events = service.subscribe();

    service.play_queue(make_tracks(&["a", "b"]), 0);
    assert_eq!(service.state().current_index, Some(0));
    assert!(service.is_polling());

    // Natural completion of "a": the pump advances to "b".
    engine.finish_current();
    wait_until(|| service.state().current_index == Some(1)).await;
    assert!(service.state().is_playing);
    assert!(service.is_polling());

    // Natural completion of "b": queue exhausted, poller stops.
    engine.finish_current();
    wait_until(|| !service.state().is_playing).await;
    wait_until(|| !service.is_polling()).await;

    let state = service.state();
    assert_eq!(state.current_index, Some(1));
    assert_eq!(state.current_track.unwrap().id, "b");

    // The bus saw the full story, ending in QueueEnded.
    let mut saw_queue_ended = false;
    while let Ok(event) = events.try_recv() {
        if let CoreEvent::Player(PlayerEvent::QueueEnded { track_id }) = event {
            assert_eq!(track_id, "b");
            saw_queue_ended = true;
        }
    }
    assert!(saw_queue_ended);

    // Both handles were released exactly once.
    let released = engine.shared().lock().unwrap().released.clone();
    assert_eq!(released, vec![1, 2]);
}

#[tokio::test]
async fn volume_set_before_playback_is_inherited() {
    let (service, engine) = build_service();

    service.set_volume(0.3);
    service.play_queue(make_tracks(&["a"]), 0);

    let state = engine.shared();
    let volume = state.lock().unwrap().sources.values().next().unwrap().volume;
    assert!((volume - 0.3).abs() < f32::EPSILON);
    assert!((service.state().volume - 0.3).abs() < f32::EPSILON);
}

#[tokio::test]
async fn transport_commands_flow_through_the_service() {
    let (service, _engine) = build_service();
    let tracks = make_tracks(&["a", "b", "c"]);

    service.play_queue(tracks, 0);
    service.next();
    assert_eq!(service.state().current_index, Some(1));

    service.previous();
    assert_eq!(service.state().current_index, Some(0));

    service.toggle_play_pause();
    assert!(!service.state().is_playing);
    service.toggle_play_pause();
    assert!(service.state().is_playing);
}

// ============================================================================
// Seek drag
// ============================================================================

#[tokio::test]
async fn seek_drag_flag_follows_begin_and_settle() {
    let (service, _engine) = build_service();

    service.begin_seek_drag();
    assert!(service.is_seek_dragging());

    service.end_seek_drag();
    // Cleared only after the settle delay.
    assert!(service.is_seek_dragging());
    wait_until(|| !service.is_seek_dragging()).await;
}
